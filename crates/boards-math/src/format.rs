//! Display helpers: identifier elision and minimal-unit conversions

use crate::coin::Coin;
use crate::denom::{DenomRegistry, TokenConfig};
use rust_decimal::Decimal;
use thiserror::Error;

const ELLIPSIS: char = '…';

/// Width used when showing account addresses
pub const ADDRESS_DISPLAY_LEN: usize = 24;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown denomination:: {0}")]
    UnknownDenom(String),

    #[error("invalid amount:: {0}")]
    InvalidAmount(String),
}

/// Shorten `text` to at most `max_len` characters by replacing its middle
/// with a single ellipsis.
///
/// The front slice gets `ceil((max_len - 1) / 2)` characters and the tail
/// `floor((max_len - 1) / 2)`. A `max_len` of zero still yields the ellipsis.
pub fn elide_middle(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }

    let kept = max_len.saturating_sub(1);
    let front_len = kept.div_ceil(2);
    let tail_len = kept / 2;

    let mut out = String::with_capacity(max_len + ELLIPSIS.len_utf8());
    out.extend(text.chars().take(front_len));
    out.push(ELLIPSIS);
    out.extend(text.chars().skip(len - tail_len));
    out
}

/// Shorten an account address for display
pub fn format_address(address: &str) -> String {
    elide_middle(address, ADDRESS_DISPLAY_LEN)
}

/// `10^decimals` as a decimal, bounded by the type's precision
fn unit_scale(decimals: u32) -> Result<Decimal, FormatError> {
    if decimals > Decimal::MAX_SCALE {
        return Err(FormatError::InvalidAmount(format!(
            "{decimals} decimals exceeds supported precision"
        )));
    }
    Ok(Decimal::from_i128_with_scale(10i128.pow(decimals), 0))
}

impl DenomRegistry {
    fn token(&self, denom: &str) -> Result<&TokenConfig, FormatError> {
        self.lookup(denom)
            .ok_or_else(|| FormatError::UnknownDenom(denom.to_string()))
    }

    /// Convert a minimal-unit amount into display units.
    pub fn format_amount(&self, amount: u128, denom: &str) -> Result<Decimal, FormatError> {
        let decimals = self.token(denom)?.decimals;
        let units = i128::try_from(amount)
            .map_err(|_| FormatError::InvalidAmount(amount.to_string()))?;
        Decimal::try_from_i128_with_scale(units, decimals)
            .map(|d| d.normalize())
            .map_err(|e| FormatError::InvalidAmount(format!("{amount}: {e}")))
    }

    /// Human readable price, e.g. `1.5 GNOT` for `1500000ugnot`
    pub fn format_price(&self, coin: &Coin) -> Result<String, FormatError> {
        let name = &self.token(&coin.denom)?.name;
        let amount = self.format_amount(coin.amount, &coin.denom)?;
        Ok(format!("{amount} {name}"))
    }

    /// Convert a display amount into an integer string of minimal units.
    ///
    /// Fractions smaller than one minimal unit are floored away, so this is
    /// only an exact inverse of [`DenomRegistry::format_amount`] for amounts
    /// that came from whole minimal units.
    pub fn to_minimal_denom(&self, amount: Decimal, denom: &str) -> Result<String, FormatError> {
        let token = self.token(denom)?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(FormatError::InvalidAmount(amount.to_string()));
        }

        let minimal = amount
            .checked_mul(unit_scale(token.decimals)?)
            .ok_or_else(|| FormatError::InvalidAmount(format!("{amount} overflows")))?;

        Ok(minimal.floor().to_string())
    }
}
