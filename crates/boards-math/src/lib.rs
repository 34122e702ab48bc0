//! Token math for boards
//!
//! Coin amounts in minimal units, the static denomination registry, and the
//! conversions used to display amounts and addresses to users.

pub mod coin;
pub mod denom;
pub mod format;

pub use coin::{parse_coins, Coin, CoinError};
pub use denom::{DenomRegistry, TokenConfig};
pub use format::{elide_middle, format_address, FormatError};
pub use rust_decimal::Decimal;
