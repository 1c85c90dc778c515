//! Catalog domain module.
//!
//! This crate contains the business rules for the storefront catalog, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage): product
//! validation, catalog search semantics, the dashboard stats aggregation, the
//! coupon rule and the checkout order/receipt model.

pub mod coupon;
pub mod order;
pub mod product;
pub mod query;
pub mod specs;
pub mod stats;

pub use coupon::{CouponCheck, check_coupon};
pub use order::{LineOutcome, LineStatus, Order, OrderLine, OrderReceipt, new_order_id};
pub use product::{MAX_PRICE, Product, ProductFields};
pub use query::{CatalogParams, ProductQuery, SortOrder};
pub use specs::{SpecKind, SpecValue, Specs};
pub use stats::{DailyTotal, StatsSnapshot};
