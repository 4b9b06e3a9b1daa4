//! # Pricing
//!
//! Cart arithmetic shared by the cart view and checkout.
//!
//! ```text
//! lines ──► Σ price × quantity ──► subtotal
//!                                     │
//!                     coupon? ────────┤
//!                                     ▼
//!                   discount = round_half_up(subtotal × bps / 10000)
//!                                     │
//!                                     ▼
//!                          total = subtotal - discount
//! ```
//!
//! Subtotals are exact. The discount is the only rounded value and it is
//! rounded once. Line totals and the subtotal use checked arithmetic and
//! report `AmountTooLarge` instead of wrapping.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};
use crate::types::CartItemView;

/// Sum of `price × quantity` over all lines.
pub fn subtotal(lines: &[CartItemView]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.line_total()?)
            .ok_or_else(|| CoreError::AmountTooLarge {
                context: "cart subtotal".to_string(),
            })
    })
}

/// Subtotal, discount and final total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl CartTotals {
    /// Totals with no coupon applied.
    pub fn undiscounted(subtotal: Money) -> Self {
        CartTotals {
            subtotal,
            discount: Money::zero(),
            total: subtotal,
        }
    }

    /// Applies a coupon rate to the subtotal.
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::money::{DiscountRate, Money};
    /// use shopcart_core::pricing::CartTotals;
    ///
    /// let totals = CartTotals::undiscounted(Money::from_cents(20_000))
    ///     .with_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(totals.discount.cents(), 2_000);
    /// assert_eq!(totals.total.cents(), 18_000);
    /// ```
    pub fn with_discount(self, rate: DiscountRate) -> Self {
        let discount = self.subtotal.discount(rate);
        CartTotals {
            subtotal: self.subtotal,
            discount,
            total: self.subtotal - discount,
        }
    }
}

/// Priced snapshot of a cart's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<CartItemView>,
    pub totals: CartTotals,
}

impl PricedCart {
    pub fn new(lines: Vec<CartItemView>) -> CoreResult<Self> {
        let totals = CartTotals::undiscounted(subtotal(&lines)?);
        Ok(PricedCart { lines, totals })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn apply_coupon(&mut self, rate: DiscountRate) {
        self.totals = self.totals.with_discount(rate);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: i64) -> CartItemView {
        CartItemView {
            product_id: uuid::Uuid::new_v4().to_string(),
            product_name: "Widget".to_string(),
            price: Money::from_cents(price),
            quantity,
        }
    }

    #[test]
    fn test_subtotal_is_quantity_aware() {
        let lines = vec![line(1999, 3), line(500, 1)];
        assert_eq!(subtotal(&lines).unwrap().cents(), 6497);
    }

    #[test]
    fn test_empty_subtotal_is_zero() {
        assert!(subtotal(&[]).unwrap().is_zero());
        assert!(PricedCart::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let lines = vec![line(i64::MAX / 2 + 1, 2)];
        assert!(matches!(
            subtotal(&lines),
            Err(CoreError::AmountTooLarge { .. })
        ));
        assert!(PricedCart::new(lines).is_err());
    }

    #[test]
    fn test_subtotal_overflow_is_an_error() {
        // each line fits, their sum does not
        let lines = vec![line(i64::MAX / 2 + 1, 1), line(i64::MAX / 2 + 1, 1)];
        let err = subtotal(&lines).unwrap_err();
        assert_eq!(err.to_string(), "Amount too large: cart subtotal");
    }

    #[test]
    fn test_largest_valid_cart_fits() {
        use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

        let lines: Vec<_> = (0..MAX_CART_ITEMS)
            .map(|_| line(MAX_PRICE_CENTS, MAX_ITEM_QUANTITY))
            .collect();
        let total = subtotal(&lines).unwrap();
        assert_eq!(
            total.cents(),
            MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64
        );
    }

    #[test]
    fn test_coupon_on_two_hundred() {
        let mut cart = PricedCart::new(vec![line(10_000, 2)]).unwrap();
        cart.apply_coupon(DiscountRate::from_percentage(10.0));
        assert_eq!(cart.totals.subtotal.cents(), 20_000);
        assert_eq!(cart.totals.discount.cents(), 2_000);
        assert_eq!(cart.totals.total.cents(), 18_000);
    }

    #[test]
    fn test_discount_rounded_once() {
        // 3 × $0.35 = $1.05; 15% = 15.75 cents → 16
        let totals = CartTotals::undiscounted(subtotal(&[line(35, 3)]).unwrap())
            .with_discount(DiscountRate::from_bps(1500));
        assert_eq!(totals.discount.cents(), 16);
        assert_eq!(totals.total.cents(), 89);
    }
}
