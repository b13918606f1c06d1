//! Amounts on the ledger
//!
//! Values are decimal coin amounts stored as integer base units so that
//! balances add up exactly. One coin is 100,000,000 units.

use crate::error::{BlockchainError, Result};

/// Number of base units in one coin
pub const UNITS_PER_COIN: u64 = 100_000_000;

/// Digits after the decimal point representable in base units
pub const COIN_DECIMALS: usize = 8;

/// Coinbase reward per block (12.5 coins)
pub const BLOCK_REWARD: u64 = 12 * UNITS_PER_COIN + UNITS_PER_COIN / 2;

pub mod conversions {
    use super::*;

    /// ```
    /// use pow_ledger::core::monetary::conversions::format_units;
    /// assert_eq!(format_units(750_000_000), "7.50000000");
    /// ```
    pub fn format_units(units: u64) -> String {
        format!(
            "{}.{:0width$}",
            units / UNITS_PER_COIN,
            units % UNITS_PER_COIN,
            width = COIN_DECIMALS
        )
    }

    /// Parse a decimal coin amount such as `"5"` or `"0.25"` without going
    /// through floating point.
    pub fn parse_coins(text: &str) -> Result<u64> {
        let invalid = || BlockchainError::Transaction(format!("Invalid amount: {text}"));
        let (whole, frac) = match text.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (text, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > COIN_DECIMALS
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| invalid())?
                .checked_mul(UNITS_PER_COIN)
                .ok_or_else(invalid)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<width$}", width = COIN_DECIMALS)
                .parse::<u64>()
                .map_err(|_| invalid())?
        };
        whole_units.checked_add(frac_units).ok_or_else(invalid)
    }
}
