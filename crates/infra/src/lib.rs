//! Infrastructure layer: storage backends, upload storage and the application
//! services that orchestrate them (catalog, checkout, accounts).

pub mod accounts;
pub mod catalog;
pub mod checkout;
pub mod store;
pub mod uploads;

pub use accounts::{AccessToken, AccountError, AccountService};
pub use catalog::{CatalogError, CatalogService};
pub use checkout::CheckoutService;
pub use store::{
    InMemoryProductStore, InMemoryUserStore, PostgresProductStore, PostgresUserStore, ProductStore,
    StockDecrement, StoreError, UserStore,
};
pub use uploads::{ImageRules, ImageStorage, PRODUCT_IMAGES, UploadError, UploadedFile};
