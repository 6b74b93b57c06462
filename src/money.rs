//! Fixed-precision money values
//!
//! Monetary fields are stored as whole cents in a newtype, never as floats,
//! so repeated parse/format round-trips cannot drift. The serde form is a
//! two-decimal string ("50000.00"), which keeps persisted return documents
//! human-diffable.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;

/// Parse failure for a monetary string.
///
/// Deliberately carries no copy of the offending input: amounts live next
/// to SSNs in the same documents and error text must stay value-free.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("not a non-negative amount with at most two decimal places")]
pub struct AmountParseError;

/// A non-negative dollar amount with fixed two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest representable amount
    pub const MAX: Amount = Amount(u64::MAX);

    /// Construct from whole cents
    pub fn from_cents(cents: u64) -> Self {
        Amount(cents)
    }

    /// Construct from whole dollars, saturating at `Amount::MAX`.
    ///
    /// Document-supplied numbers go through `try_from_dollars` instead so
    /// an out-of-range value is reported rather than clamped.
    pub fn from_dollars(dollars: u64) -> Self {
        Amount(dollars.saturating_mul(100))
    }

    /// Construct from whole dollars, rejecting values past `Amount::MAX`.
    pub fn try_from_dollars(dollars: u64) -> Result<Amount, AmountParseError> {
        dollars.checked_mul(100).map(Amount).ok_or(AmountParseError)
    }

    /// Whole cents
    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a user- or document-supplied amount string.
    ///
    /// Accepts an optional leading `$`, thousands separators, and zero, one
    /// or two decimal places: `"1234"`, `"$1,234.5"`, `"1234.56"`. Rejects
    /// negatives, empty strings, and anything past two decimal places.
    pub fn parse(input: &str) -> Result<Amount, AmountParseError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(AmountParseError);
        }

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (trimmed, None),
        };

        let mut cents: u64 = 0;
        let mut saw_digit = false;
        for ch in whole.chars() {
            if ch == ',' {
                continue;
            }
            let digit = ch.to_digit(10).ok_or(AmountParseError)? as u64;
            saw_digit = true;
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(digit))
                .ok_or(AmountParseError)?;
        }
        cents = cents.checked_mul(100).ok_or(AmountParseError)?;

        if let Some(frac) = frac {
            if frac.is_empty() || frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(AmountParseError);
            }
            let mut frac_cents: u64 = frac.parse().map_err(|_| AmountParseError)?;
            if frac.len() == 1 {
                frac_cents *= 10;
            }
            cents = cents.checked_add(frac_cents).ok_or(AmountParseError)?;
            saw_digit = true;
        }

        if !saw_digit {
            return Err(AmountParseError);
        }
        Ok(Amount(cents))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

// Sums over document-supplied entries saturate at `Amount::MAX` instead
// of wrapping or panicking; out-of-range inputs are already rejected at
// parse time, so saturation is unreachable for valid documents.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept whole-dollar JSON integers for hand-written documents;
        // canonical form is the two-decimal string.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Whole(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => {
                Amount::parse(&s).map_err(|e| D::Error::custom(format!("amount: {e}")))
            }
            Raw::Whole(d) => {
                Amount::try_from_dollars(d).map_err(|e| D::Error::custom(format!("amount: {e}")))
            }
        }
    }
}
