//! Service wiring: pick the storage backend and build the application services.

use std::sync::Arc;

use tracing::{info, warn};

use rigshop_auth::Hs256Tokens;
use rigshop_infra::store::postgres;
use rigshop_infra::{
    AccountService, CatalogService, CheckoutService, ImageStorage, InMemoryProductStore,
    InMemoryUserStore, PostgresProductStore, PostgresUserStore, ProductStore, StoreError, UserStore,
};

use crate::config::Config;

pub struct AppServices {
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
    pub accounts: AccountService,
    pub tokens: Arc<Hs256Tokens>,
}

impl AppServices {
    pub fn new(
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        images: ImageStorage,
        tokens: Arc<Hs256Tokens>,
    ) -> Self {
        Self {
            catalog: CatalogService::new(products.clone(), images),
            checkout: CheckoutService::new(products),
            accounts: AccountService::new(users, tokens.clone()),
            tokens,
        }
    }
}

/// Build services for `config`: Postgres when `DATABASE_URL` is set, the
/// in-memory stores otherwise.
pub async fn build_services(config: &Config) -> Result<AppServices, StoreError> {
    let tokens = Arc::new(Hs256Tokens::new(config.jwt_secret.as_bytes(), config.jwt_ttl()));
    let images = ImageStorage::new(&config.upload_dest);

    type Stores = (Arc<dyn ProductStore>, Arc<dyn UserStore>);
    let (products, users): Stores = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url, config.database_max_connections).await?;
            postgres::apply_schema(&pool).await?;
            info!("using postgres storage");
            (
                Arc::new(PostgresProductStore::new(pool.clone())),
                Arc::new(PostgresUserStore::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory storage (data is lost on restart)");
            (
                Arc::new(InMemoryProductStore::new()),
                Arc::new(InMemoryUserStore::new()),
            )
        }
    };

    Ok(AppServices::new(products, users, images, tokens))
}
