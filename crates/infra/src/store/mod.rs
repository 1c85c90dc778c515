//! Persistence abstractions for products and user accounts.
//!
//! Two backends implement each trait:
//! - `memory`: process-local maps behind an `RwLock` (dev/test).
//! - `postgres`: SQLx-backed tables (`products`, `users`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use rigshop_auth::User;
use rigshop_catalog::{Product, ProductFields, ProductQuery};
use rigshop_core::{DomainError, ProductId, UserId};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryProductStore, InMemoryUserStore};
pub use postgres::{PostgresProductStore, PostgresUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, PartialEq)]
pub enum StockDecrement {
    /// Stock covered the quantity; the product after the sale.
    Applied(Product),
    /// Not enough stock; the product is unchanged.
    Insufficient(Product),
    /// No product with that id.
    Missing,
}

/// Product collection.
///
/// Every write is atomic per product: `update` and `decrement_stock` perform
/// their read-modify-write without letting a concurrent writer interleave.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Matching products, ordered as the query asks.
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;

    /// Every product (stats snapshot input).
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Apply a validated partial edit. `Ok(None)` when the product does not exist.
    async fn update(
        &self,
        id: &ProductId,
        patch: ProductFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;

    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Decrement-if-sufficient: take `quantity` units and count them as sold,
    /// only when the current stock covers the whole quantity.
    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<StockDecrement, StoreError>;
}

/// Registered accounts, unique by (lower-cased) email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DomainError::Conflict` when the email is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}
