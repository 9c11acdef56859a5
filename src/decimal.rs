//! Fixed-point decimal type with 4 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so reward
//! amounts, rates, caps and value scores never touch floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// A decimal type that maintains exactly 4 decimal places of precision.
///
/// This type wraps `rust_decimal::Decimal` and ensures consistent scale
/// for all arithmetic, suitable both for monetary amounts and for reward
/// rates (a 2% rate is `0.0200`).
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use card_recommender::Fixed4;
///
/// let amount = Fixed4::from_str("100").unwrap();
/// let rate = Fixed4::from_str("0.02").unwrap();
/// assert_eq!((amount * rate).to_string(), "2.0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fixed4(Decimal);

impl Fixed4 {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 4;

    /// Zero value.
    pub const ZERO: Self = Fixed4(Decimal::ZERO);

    /// One, convenient as the identity conversion factor.
    pub const ONE: Self = Fixed4(Decimal::ONE);

    /// Creates a new `Fixed4` from a `Decimal`, normalizing to 4 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Fixed4(normalized)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Subtracts `rhs`, clamping at zero instead of going negative.
    ///
    /// Used for cap headroom: a ledger that already exceeds the cap
    /// yields zero headroom, not a negative reward.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs >= self {
            Fixed4::ZERO
        } else {
            self - rhs
        }
    }

    /// Divides by `rhs`, returning `None` when `rhs` is zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.0.checked_div(rhs.0).map(Fixed4::new)
    }
}

impl FromStr for Fixed4 {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Fixed4::new(decimal))
    }
}

impl fmt::Display for Fixed4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl Add for Fixed4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed4::new(self.0 + rhs.0)
    }
}

impl AddAssign for Fixed4 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Fixed4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Fixed4::new(self.0 - rhs.0)
    }
}

impl SubAssign for Fixed4 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Mul for Fixed4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Fixed4::new(self.0 * rhs.0)
    }
}

impl Serialize for Fixed4 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.4}", self.0))
    }
}

impl<'de> Deserialize<'de> for Fixed4 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept either a JSON string ("0.02") or a bare number (0.02).
        struct Fixed4Visitor;

        impl serde::de::Visitor<'_> for Fixed4Visitor {
            type Value = Fixed4;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or numeric string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Fixed4, E> {
                Fixed4::from_str(v).map_err(E::custom)
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Fixed4, E> {
                Decimal::try_from(v).map(Fixed4::new).map_err(E::custom)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Fixed4, E> {
                Ok(Fixed4::new(Decimal::from(v)))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Fixed4, E> {
                Ok(Fixed4::new(Decimal::from(v)))
            }
        }

        deserializer.deserialize_any(Fixed4Visitor)
    }
}
