//! Nano fixed-point amounts
//!
//! Every amount the protocol puts on the wire (native value, prices, leverage,
//! margin, fees) is an unsigned integer with 9 implied decimal places. `Nano`
//! keeps that integer exact and only converts to `Decimal` at display or
//! configuration boundaries.

use crate::common::errors::FixedPointError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of implied decimal places for every protocol amount
pub const NANO_DECIMALS: u32 = 9;

/// Unsigned amount with 9 decimal places
///
/// Examples:
/// - 1 TON = Nano(1_000_000_000)
/// - 0.35 TON = Nano(350_000_000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Nano(pub u128);

impl Nano {
    /// Scale factor for 9 decimal places
    pub const SCALE: u128 = 1_000_000_000;

    pub const ZERO: Self = Self(0);

    /// One whole unit
    pub const ONE: Self = Self(Self::SCALE);

    /// Create from whole units (compile-time constant)
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * Self::SCALE)
    }

    /// Create from a decimal string with exact parsing
    ///
    /// This is the PRIMARY method for amounts coming from configuration or
    /// user input. Digits past the ninth fractional place are rejected rather
    /// than rounded.
    ///
    /// # Examples
    /// ```
    /// use storm_types::Nano;
    ///
    /// let fee = Nano::from_decimal_str("0.35").unwrap();
    /// assert_eq!(fee.raw_value(), 350_000_000);
    /// ```
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| FixedPointError::InvalidDecimal {
            input: s.to_string(),
        })?;

        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(FixedPointError::Negative {
                input: s.to_string(),
            });
        }
        if decimal.normalize().scale() > NANO_DECIMALS {
            return Err(FixedPointError::PrecisionLoss {
                input: s.to_string(),
            });
        }

        let scaled = decimal
            .checked_mul(Decimal::from(Self::SCALE as u64))
            .ok_or_else(|| FixedPointError::Overflow {
                input: s.to_string(),
            })?;

        scaled
            .to_u128()
            .map(Self)
            .ok_or_else(|| FixedPointError::Overflow {
                input: s.to_string(),
            })
    }

    /// Convert to `Decimal`; `None` when the raw value exceeds the 96-bit
    /// decimal mantissa
    pub fn to_decimal(self) -> Option<Decimal> {
        let raw = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(raw, NANO_DECIMALS).ok()
    }

    /// Get the raw scaled integer value
    pub fn raw_value(self) -> u128 {
        self.0
    }

    /// Create from raw scaled integer
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

/// Rescale a raw 9-decimal ratio (referral discount, rebate) to `Decimal`
pub fn ratio_from_nano(raw: u32) -> Decimal {
    Decimal::new(i64::from(raw), NANO_DECIMALS).normalize()
}

impl From<u128> for Nano {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<Nano> for u128 {
    fn from(value: Nano) -> Self {
        value.0
    }
}

impl FromStr for Nano {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl fmt::Display for Nano {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:09}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
