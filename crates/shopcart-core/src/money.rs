//! # Money Module
//!
//! Provides the `Money` type for monetary values and `DiscountRate` for
//! coupon percentages.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart of 3 × $19.99 with 10% off:                                    │
//! │    59.97 × 0.9 = 53.973000000000006  → which cent do we charge?        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    5997 cents, discount (5997 × 1000 + 5000) / 10000 = 600 cents       │
//! │    total 5397 cents, rounded exactly once                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopcart_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//! assert_eq!(doubled.cents(), 2198);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never wraps; prices themselves are validated `>= 0`
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde/sqlx**: stored and serialized as a bare integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Product.price ──► CartItemView.price ──► line total (price × qty)     │
/// │                                                                         │
/// │  Σ line totals ──► subtotal ──► coupon discount ──► receipt total       │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, `None` if the result leaves the i64 range.
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.checked_mul_quantity(3);
    /// assert_eq!(line_total, Some(Money::from_cents(897))); // $8.97
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Computes the discount amount for a rate, rounded half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(5997);   // $59.97
    /// let rate = DiscountRate::from_bps(1000);  // 10%
    ///
    /// // $5.997 → rounds to $6.00
    /// assert_eq!(subtotal.discount(rate).cents(), 600);
    /// ```
    pub fn discount(&self, rate: DiscountRate) -> Money {
        // i128 keeps large carts from overflowing the intermediate product
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Returns the amount left after applying a discount rate.
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(20000); // $200.00
    /// let total = subtotal.apply_discount(DiscountRate::from_bps(1000)); // 10% off
    /// assert_eq!(total.cents(), 18000); // $180.00
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount(rate)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A coupon discount in basis points (1 bp = 0.01%).
///
/// ```text
/// 10%    → 1000 bps
/// 12.5%  → 1250 bps
/// 100%   → 10000 bps (maximum, total becomes zero)
/// ```
///
/// Basis points keep fractional percentages exact; no float ever touches
/// the money path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Upper bound: a 100% discount.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage, rounded to the nearest basis point.
    ///
    /// Only meant for literals and display conversions.
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `0 < rate <= 100%`.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0 && self.0 <= Self::MAX_BPS
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as "$10.99" (for logs and debugging).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
