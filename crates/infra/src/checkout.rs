//! Checkout: apply an order's lines to inventory.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use rigshop_catalog::{LineOutcome, LineStatus, Order, OrderReceipt, new_order_id};
use rigshop_core::ProductId;

use crate::store::{ProductStore, StockDecrement, StoreError};

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn ProductStore>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Process the order line by line.
    ///
    /// Each line is an independent decrement-if-sufficient. A line that cannot
    /// be served (unknown product, short stock) is reported and skipped; it does
    /// not undo earlier lines or stop later ones. A backend error aborts the
    /// remaining lines and already-applied lines stay applied.
    #[instrument(skip(self, order), fields(lines = order.items.len()), err)]
    pub async fn checkout(&self, order: Order) -> Result<OrderReceipt, StoreError> {
        order.validate()?;

        let order_id = new_order_id();
        let mut outcomes = Vec::with_capacity(order.items.len());

        for line in order.items {
            let decrement = match line.id.parse::<ProductId>() {
                Ok(id) => self.store.decrement_stock(&id, line.quantity, Utc::now()).await?,
                Err(_) => StockDecrement::Missing,
            };

            let (name, status) = match decrement {
                StockDecrement::Applied(p) => (Some(p.name), LineStatus::Fulfilled),
                StockDecrement::Insufficient(p) => {
                    warn!(
                        order_id = %order_id,
                        product_id = %line.id,
                        requested = line.quantity,
                        available = p.stock,
                        "skipping order line: insufficient stock"
                    );
                    (Some(p.name), LineStatus::OutOfStock)
                }
                StockDecrement::Missing => {
                    warn!(
                        order_id = %order_id,
                        product_id = %line.id,
                        "skipping order line: product not found"
                    );
                    (None, LineStatus::NotFound)
                }
            };
            outcomes.push(LineOutcome {
                id: line.id,
                name,
                quantity: line.quantity,
                status,
            });
        }

        let receipt = OrderReceipt::new(order_id, outcomes, Utc::now());
        info!(
            order_id = %receipt.order_id,
            fulfilled = receipt.fulfilled(),
            lines = receipt.items.len(),
            "order processed"
        );
        Ok(receipt)
    }
}
