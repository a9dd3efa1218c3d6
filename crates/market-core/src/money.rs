//! # Money Module
//!
//! Provides the `Money` type for prices and line totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every price in the store is an integer count of MINOR units            │
//! │  (tiyin, cents, ...). Line totals are quantity × unit price:            │
//! │                                                                         │
//! │    12 × 4 500 = 54 000    exact, no rounding step anywhere              │
//! │                                                                         │
//! │  The only failure mode is overflow, which is reported instead of        │
//! │  silently wrapping.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::money::Money;
//!
//! let unit = Money::from_minor(4_500);
//! assert_eq!(unit.times(12).unwrap().minor(), 54_000);
//! assert!(Money::from_minor(i64::MAX).times(2).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary value in the smallest currency unit.
///
/// Serialized transparently as the bare integer so stored columns and JSON
/// payloads stay plain `BIGINT` / number values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Intake line: "Sparkling water", 12 pcs @ 4 500
    ///      │
    ///      ▼
    /// times(12) ← THIS FUNCTION
    ///      │
    ///      ├── overflow? → None (caller reports a validation error)
    ///      │
    ///      ▼
    /// total_price: 54 000
    /// ```
    #[inline]
    pub const fn times(&self, quantity: i64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(total) => Some(Money(total)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(total) => Some(Money(total)),
            None => None,
        }
    }
}

/// Shows the value with two fractional digits (debug output only).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
