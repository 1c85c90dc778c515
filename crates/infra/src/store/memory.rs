use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rigshop_auth::User;
use rigshop_catalog::{Product, ProductFields, ProductQuery};
use rigshop_core::{DomainError, ProductId, UserId};

use super::{ProductStore, StockDecrement, StoreError, UserStore};

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::backend(operation, "lock poisoned")
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("insert"))?;
        if map.contains_key(&product.id) {
            return Err(
                DomainError::conflict(format!("product {} already exists", product.id)).into(),
            );
        }
        map.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("get"))?;
        Ok(map.get(id).cloned())
    }

    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("search"))?;
        Ok(query.apply(map.values().cloned()))
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("list"))?;
        Ok(ProductQuery::default().apply(map.values().cloned()))
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: ProductFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("update"))?;
        let Some(product) = map.get_mut(id) else {
            return Ok(None);
        };
        product.apply_patch(patch, now)?;
        Ok(Some(product.clone()))
    }

    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("remove"))?;
        Ok(map.remove(id))
    }

    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<StockDecrement, StoreError> {
        // Check and write under one guard so concurrent orders cannot both see
        // the last unit.
        let mut map = self.inner.write().map_err(|_| poisoned("decrement_stock"))?;
        let Some(product) = map.get_mut(id) else {
            return Ok(StockDecrement::Missing);
        };
        if product.sell(quantity, now) {
            Ok(StockDecrement::Applied(product.clone()))
        } else {
            Ok(StockDecrement::Insufficient(product.clone()))
        }
    }
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("insert_user"))?;
        if map.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict("email is already registered").into());
        }
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("find_by_email"))?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("get_user"))?;
        Ok(map.get(id).cloned())
    }
}
