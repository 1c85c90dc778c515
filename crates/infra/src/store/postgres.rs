//! Postgres-backed product and account stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Domain(Conflict)` |
//! | Database (check violation) | `23514` | `Domain(Validation)` |
//! | Anything else | - | `Backend` |
//!
//! ## Stock decrements
//!
//! `decrement_stock` is a single conditional `UPDATE ... WHERE stock >= $n`.
//! Postgres re-checks the predicate against the latest committed row when two
//! updates race, so a unit can only be sold once.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use async_trait::async_trait;
use rigshop_auth::{Role, User};
use rigshop_catalog::{Product, ProductFields, ProductQuery, SortOrder, Specs};
use rigshop_core::{DomainError, FieldViolation, ProductId, UserId};

use super::{ProductStore, StockDecrement, StoreError, UserStore};

const SCHEMA: &str = include_str!("schema.sql");

const PRODUCT_COLUMNS: &str = "id, name, price, stock, sold, points, description, category, brand, \
     image, gallery, colors, warranty, specs, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

/// Open a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the tables and indexes if they are missing. Idempotent.
#[instrument(skip(pool), err)]
pub async fn apply_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("apply_schema", e))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.map(|r| product_from_row(&r)).transpose()
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        );
        sqlx::query(&sql)
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(product.price)
            .bind(i64::from(product.stock))
            .bind(i64::from(product.sold))
            .bind(i64::from(product.points))
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.brand)
            .bind(&product.image)
            .bind(Json(&product.gallery))
            .bind(Json(&product.colors))
            .bind(&product.warranty)
            .bind(Json(&product.specs))
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.fetch_one_product(id).await
    }

    #[instrument(skip(self, query), err)]
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(keyword) = &query.keyword {
            let pattern = format!("%{}%", escape_like(keyword));
            qb.push(" AND (");
            for (i, column) in ["name", "description", "brand", "category"].iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
        }
        if let Some(min) = query.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = query.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(categories) = &query.categories {
            qb.push(" AND category = ANY(").push_bind(categories.clone()).push(")");
        }
        if let Some(brands) = &query.brands {
            qb.push(" AND brand = ANY(").push_bind(brands.clone()).push(")");
        }
        qb.push(match query.sort {
            SortOrder::PriceAsc => " ORDER BY price ASC, created_at DESC, id DESC",
            SortOrder::PriceDesc => " ORDER BY price DESC, created_at DESC, id DESC",
            SortOrder::Newest => " ORDER BY created_at DESC, id DESC",
        });

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.search(&ProductQuery::default()).await
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(
        &self,
        id: &ProductId,
        patch: ProductFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_update", e))?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let Some(row) = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_product", e))?
        else {
            return Ok(None);
        };
        let mut product = product_from_row(&row)?;
        product.apply_patch(patch, now)?;

        sqlx::query(
            r#"
            UPDATE products SET
                name = $2, price = $3, stock = $4, sold = $5, points = $6,
                description = $7, category = $8, brand = $9, image = $10,
                gallery = $11, colors = $12, warranty = $13, specs = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price)
        .bind(i64::from(product.stock))
        .bind(i64::from(product.sold))
        .bind(i64::from(product.points))
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(&product.image)
        .bind(Json(&product.gallery))
        .bind(Json(&product.colors))
        .bind(&product.warranty)
        .bind(Json(&product.specs))
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_update", e))?;
        Ok(Some(product))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn remove(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_product", e))?;
        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<StockDecrement, StoreError> {
        if quantity > 0 {
            let sql = format!(
                "UPDATE products SET stock = stock - $2, sold = sold + $2, updated_at = $3 \
                 WHERE id = $1 AND stock >= $2 RETURNING {PRODUCT_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(id.as_uuid())
                .bind(i64::from(quantity))
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("decrement_stock", e))?;
            if let Some(row) = row {
                return Ok(StockDecrement::Applied(product_from_row(&row)?));
            }
        }

        // Nothing was updated: tell a short stock apart from a missing product.
        Ok(match self.fetch_one_product(id).await? {
            Some(product) => StockDecrement::Insufficient(product),
            None => StockDecrement::Missing,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let sql = format!("INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)");
        sqlx::query(&sql)
            .bind(user.id.as_uuid())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error("insert_user", e) {
                StoreError::Domain(DomainError::Conflict(_)) => {
                    DomainError::conflict("email is already registered").into()
                }
                other => other,
            })?;
        Ok(user)
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.map(|r| user_from_row(&r)).transpose()
    }
}

/// Escape `LIKE` metacharacters so a keyword is matched literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DomainError::conflict(msg).into(),
                Some("23514") => {
                    let column = db_err.constraint().unwrap_or("row").to_string();
                    DomainError::Validation(vec![FieldViolation::new(column, msg)]).into()
                }
                _ => StoreError::backend(operation, msg),
            }
        }
        other => StoreError::backend(operation, other.to_string()),
    }
}

/// Raw `products` row, before counters are narrowed.
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    stock: i64,
    sold: i64,
    points: i64,
    description: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    image: Option<String>,
    gallery: Json<Vec<String>>,
    colors: Json<Vec<String>>,
    warranty: Option<String>,
    specs: Json<Specs>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            sold: row.try_get("sold")?,
            points: row.try_get("points")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            brand: row.try_get("brand")?,
            image: row.try_get("image")?,
            gallery: row.try_get("gallery")?,
            colors: row.try_get("colors")?,
            warranty: row.try_get("warranty")?,
            specs: row.try_get("specs")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn narrow(column: &'static str, value: i64) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| {
        StoreError::backend("decode_product", format!("{column} out of range: {value}"))
    })
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            price: row.price,
            stock: narrow("stock", row.stock)?,
            sold: narrow("sold", row.sold)?,
            points: narrow("points", row.points)?,
            description: row.description,
            category: row.category,
            brand: row.brand,
            image: row.image,
            gallery: row.gallery.0,
            colors: row.colors.0,
            warranty: row.warranty,
            specs: row.specs.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let raw = ProductRow::from_row(row).map_err(|e| map_sqlx_error("decode_product", e))?;
    Product::try_from(raw)
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode_user", e);
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::backend("decode_user", e))?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}
