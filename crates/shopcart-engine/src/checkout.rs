//! # Checkout Transaction
//!
//! Turns a cart into a receipt inside one unit of work.
//!
//! ## State Machine
//! ```text
//!   ┌────────┐   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   ┌─────────┐
//!   │ Priced │──►│ StockVerified │──►│ StockCommitted │──►│ CouponApplied │──►│ Cleared │
//!   └───┬────┘   └──────┬────────┘   └───────┬────────┘   └──────┬────────┘   └────┬────┘
//!       │               │                    │                   │                 │
//!       └───────────────┴────────────────────┴───────────────────┴─────────────────┘
//!                                            │ any error
//!                                            ▼
//!                                       ┌────────┐
//!                                       │ Failed │  unit dropped → nothing written
//!                                       └────────┘
//! ```
//!
//! `CouponApplied` is entered even without a coupon (zero discount), so every
//! successful run visits the same states.

use std::fmt;

use shopcart_core::pricing::PricedCart;
use shopcart_core::{CheckoutReceipt, CoreError, Product};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::store::{CheckoutStore, CheckoutUnit};

/// Where a checkout run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Started,
    Priced,
    StockVerified,
    StockCommitted,
    CouponApplied,
    Cleared,
    Failed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutState::Started => "started",
            CheckoutState::Priced => "priced",
            CheckoutState::StockVerified => "stock_verified",
            CheckoutState::StockCommitted => "stock_committed",
            CheckoutState::CouponApplied => "coupon_applied",
            CheckoutState::Cleared => "cleared",
            CheckoutState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks and logs state transitions of one run.
#[derive(Debug)]
struct Progress<'a> {
    cart_id: &'a str,
    state: CheckoutState,
}

impl<'a> Progress<'a> {
    fn new(cart_id: &'a str) -> Self {
        Progress {
            cart_id,
            state: CheckoutState::Started,
        }
    }

    fn advance(&mut self, next: CheckoutState) {
        debug!(cart_id = %self.cart_id, from = %self.state, to = %next, "checkout transition");
        self.state = next;
    }

    fn fail(&mut self, err: &EngineError) {
        warn!(cart_id = %self.cart_id, state = %self.state, error = %err, "checkout failed");
        self.state = CheckoutState::Failed;
    }
}

/// Runs the checkout of `cart_id` through a fresh unit of work.
///
/// Nothing is written unless every step succeeds: errors drop the unit,
/// which rolls back stock decrements and the cart clear.
pub async fn run(
    store: &dyn CheckoutStore,
    cart_id: &str,
    coupon_code: Option<&str>,
) -> EngineResult<CheckoutReceipt> {
    let mut progress = Progress::new(cart_id);

    match execute(store, cart_id, coupon_code, &mut progress).await {
        Ok(receipt) => {
            info!(
                cart_id = %cart_id,
                lines = receipt.lines.len(),
                subtotal = %receipt.subtotal,
                discount = %receipt.discount,
                total = %receipt.total,
                coupon = receipt.coupon_code.as_deref().unwrap_or("-"),
                "checkout completed"
            );
            Ok(receipt)
        }
        Err(err) => {
            progress.fail(&err);
            Err(err)
        }
    }
}

async fn execute(
    store: &dyn CheckoutStore,
    cart_id: &str,
    coupon_code: Option<&str>,
    progress: &mut Progress<'_>,
) -> EngineResult<CheckoutReceipt> {
    let mut unit = store
        .begin()
        .await
        .map_err(EngineError::persistence("begin checkout", cart_id))?;

    // -------------------------------------------------------------------------
    // Price the lines
    // -------------------------------------------------------------------------
    let lines = unit
        .items(cart_id)
        .await
        .map_err(EngineError::persistence("load cart items", cart_id))?;
    if lines.is_empty() {
        return Err(CoreError::EmptyCart {
            cart_id: cart_id.to_string(),
        }
        .into());
    }
    let mut priced = PricedCart::new(lines)?;
    progress.advance(CheckoutState::Priced);

    // -------------------------------------------------------------------------
    // Verify stock against live rows
    // -------------------------------------------------------------------------
    let mut verified: Vec<(Product, i64)> = Vec::with_capacity(priced.lines.len());
    for line in &priced.lines {
        let product = unit
            .product(&line.product_id)
            .await
            .map_err(EngineError::persistence("load product", &line.product_id))?
            .ok_or_else(|| CoreError::not_found("Product", &line.product_id))?;

        if !product.can_fulfill(line.quantity) {
            return Err(insufficient(&product, line.quantity).into());
        }
        verified.push((product, line.quantity));
    }
    progress.advance(CheckoutState::StockVerified);

    // -------------------------------------------------------------------------
    // Decrement stock (conditional, so a concurrent writer cannot oversell)
    // -------------------------------------------------------------------------
    for (product, quantity) in &verified {
        let taken = unit
            .take_stock(&product.id, *quantity)
            .await
            .map_err(EngineError::persistence("decrement stock", &product.id))?;
        if !taken {
            return Err(insufficient(product, *quantity).into());
        }
    }
    progress.advance(CheckoutState::StockCommitted);

    // -------------------------------------------------------------------------
    // Coupon
    // -------------------------------------------------------------------------
    let code = coupon_code.map(str::trim).filter(|code| !code.is_empty());
    if let Some(code) = code {
        let coupon = apply_coupon(unit.as_mut(), code).await?;
        priced.apply_coupon(coupon);
    }
    progress.advance(CheckoutState::CouponApplied);

    // -------------------------------------------------------------------------
    // Clear and commit
    // -------------------------------------------------------------------------
    unit.clear_cart(cart_id)
        .await
        .map_err(EngineError::persistence("clear cart", cart_id))?;
    progress.advance(CheckoutState::Cleared);

    unit.commit()
        .await
        .map_err(EngineError::persistence("commit checkout", cart_id))?;

    Ok(CheckoutReceipt {
        cart_id: cart_id.to_string(),
        subtotal: priced.totals.subtotal,
        discount: priced.totals.discount,
        total: priced.totals.total,
        lines: priced.lines,
        coupon_code: code.map(str::to_string),
    })
}

/// A failed lookup is reported as an invalid coupon, same as an unknown code.
async fn apply_coupon(
    unit: &mut dyn CheckoutUnit,
    code: &str,
) -> EngineResult<shopcart_core::DiscountRate> {
    let invalid = || CoreError::InvalidCoupon {
        code: code.to_string(),
    };

    match unit.coupon(code).await {
        Ok(Some(coupon)) => Ok(coupon.discount),
        Ok(None) => Err(invalid().into()),
        Err(err) => {
            warn!(code = %code, error = %err, "coupon lookup failed");
            Err(invalid().into())
        }
    }
}

fn insufficient(product: &Product, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        product_id: product.id.clone(),
        available: product.stock,
        requested,
    }
}
