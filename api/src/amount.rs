//! Validation of the free-text tip amount typed into the tip dialog.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Decimal places accepted by the amount field (its `step` is 0.01).
pub const MAX_DECIMALS: usize = 2;

/// Why a raw amount string cannot be used for a tip.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidAmount {
    /// Nothing (or only whitespace) was entered.
    #[error("Enter an amount")]
    Empty,
    /// The string is not a plain decimal number (e.g., "abc", "1.2.3", "1e3").
    #[error("Amount must be a number")]
    NotANumber,
    #[error("Amount cannot be negative")]
    Negative,
    #[error("Amount must be greater than zero")]
    Zero,
    #[error("Amount supports at most {MAX_DECIMALS} decimal places")]
    TooManyDecimals,
    /// The contract transfers whole tokens, so "1.50" cannot be honoured.
    #[error("Amount must be a whole number of tokens")]
    Fractional,
    #[error("Amount is too large")]
    TooLarge,
}

/// A tip amount that passed validation, in whole token units. Spans the
/// contract's `uint256` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipAmount(U256);

impl TipAmount {
    pub fn units(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for TipAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TipAmount {
    type Err = InvalidAmount;

    /// Parses user input such as `"5"`, `" 12 "`, `"5."` or `"7.00"`.
    ///
    /// Leading `+`, exponents and thousands separators are rejected. A
    /// non-zero fraction is rejected instead of being truncated.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(InvalidAmount::Empty);
        }

        let (is_negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let mut parts = s.split('.');
        let whole_str = parts.next().unwrap_or("");
        let fraction_str = parts.next().unwrap_or("");

        if parts.next().is_some() || (whole_str.is_empty() && fraction_str.is_empty()) {
            return Err(InvalidAmount::NotANumber);
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole_str) || !all_digits(fraction_str) {
            return Err(InvalidAmount::NotANumber);
        }

        if fraction_str.len() > MAX_DECIMALS {
            return Err(InvalidAmount::TooManyDecimals);
        }

        let whole = if whole_str.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole_str, 10).map_err(|_| InvalidAmount::TooLarge)?
        };
        let has_fraction = fraction_str.chars().any(|c| c != '0');

        if is_negative && (!whole.is_zero() || has_fraction) {
            return Err(InvalidAmount::Negative);
        }
        if has_fraction {
            return Err(InvalidAmount::Fractional);
        }
        if whole.is_zero() {
            return Err(InvalidAmount::Zero);
        }

        Ok(Self(whole))
    }
}

/// Validates a raw amount string. Shorthand for `raw.parse::<TipAmount>()`.
pub fn validate(raw: &str) -> Result<TipAmount, InvalidAmount> {
    raw.parse()
}
