//! Coin type for amounts expressed in minimal units

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoinError {
    #[error("invalid denomination:: {0}")]
    InvalidDenom(String),

    #[error("invalid amount:: {0}")]
    InvalidAmount(String),

    #[error("invalid coin:: {0}")]
    InvalidCoin(String),
}

/// A single coin: an integer amount of minimal units of one denomination.
///
/// The amount is carried as a decimal string on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    /// Create a new coin, validating the denomination
    pub fn new(denom: impl Into<String>, amount: u128) -> Result<Self, CoinError> {
        let denom = denom.into();
        if !is_valid_denom(&denom) {
            return Err(CoinError::InvalidDenom(denom));
        }
        Ok(Self { denom, amount })
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parses the `<amount><denom>` form used by the chain, e.g. `1000000ugnot`.
impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split_pos = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinError::InvalidCoin(s.to_string()))?;

        let (amount_str, denom) = s.split_at(split_pos);
        if amount_str.is_empty() {
            return Err(CoinError::InvalidCoin(s.to_string()));
        }

        let amount = amount_str
            .parse::<u128>()
            .map_err(|e| CoinError::InvalidAmount(format!("{amount_str}: {e}")))?;

        Coin::new(denom, amount)
    }
}

/// Parse a comma separated coin list. An empty string is an empty list.
pub fn parse_coins(s: &str) -> Result<Vec<Coin>, CoinError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Coin::from_str)
        .collect()
}

#[derive(Serialize, Deserialize)]
struct CoinRepr {
    amount: String,
    denom: String,
}

impl Serialize for Coin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        CoinRepr {
            amount: self.amount.to_string(),
            denom: self.denom.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = CoinRepr::deserialize(deserializer)?;
        let amount = repr
            .amount
            .parse::<u128>()
            .map_err(serde::de::Error::custom)?;
        Coin::new(repr.denom, amount).map_err(serde::de::Error::custom)
    }
}

/// Validate denomination format
fn is_valid_denom(denom: &str) -> bool {
    if denom.is_empty() || denom.len() > 127 {
        return false;
    }

    if !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }

    denom
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coin() {
        let coin: Coin = "1000000ugnot".parse().unwrap();
        assert_eq!(coin.denom, "ugnot");
        assert_eq!(coin.amount, 1_000_000);
        assert_eq!(coin.to_string(), "1000000ugnot");
    }

    #[test]
    fn test_parse_coin_rejects_malformed() {
        assert!("ugnot".parse::<Coin>().is_err());
        assert!("1000".parse::<Coin>().is_err());
        assert!("".parse::<Coin>().is_err());
        assert!("12-bad".parse::<Coin>().is_err());
    }

    #[test]
    fn test_parse_coins() {
        let coins = parse_coins("1000ugnot, 5foo").unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[1], Coin::new("foo", 5).unwrap());

        assert!(parse_coins("").unwrap().is_empty());
    }

    #[test]
    fn test_coin_serializes_amount_as_string() {
        let coin = Coin::new("ugnot", 1).unwrap();
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"amount":"1","denom":"ugnot"}"#);

        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);
    }
}
