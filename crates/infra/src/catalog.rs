//! Catalog application service: product CRUD, search and the stats snapshot.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use rigshop_catalog::{CatalogParams, Product, ProductFields, ProductQuery, StatsSnapshot};
use rigshop_core::{DomainError, ProductId};

use crate::store::{ProductStore, StoreError};
use crate::uploads::{ImageStorage, PRODUCT_IMAGES, UploadError, UploadedFile};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        CatalogError::Store(StoreError::Domain(err))
    }
}

fn parse_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse::<ProductId>()
        .map_err(|_| DomainError::not_found("Product", raw))
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    images: ImageStorage,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, images: ImageStorage) -> Self {
        Self { store, images }
    }

    /// Validate the fields, store the cover image if one came with them, then
    /// persist the product.
    #[instrument(skip(self, fields, image), fields(has_image = image.is_some()), err)]
    pub async fn create(
        &self,
        mut fields: ProductFields,
        image: Option<UploadedFile>,
    ) -> Result<Product, CatalogError> {
        fields.validate(true)?;
        if let Some(file) = image {
            fields.image = Some(self.images.store(&PRODUCT_IMAGES, file).await?);
        }

        let product = Product::create(ProductId::new(), fields, Utc::now())?;
        let product = self.store.insert(product).await?;
        info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub async fn find_all(&self, params: CatalogParams) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::try_from(params)?;
        Ok(self.store.search(&query).await?)
    }

    pub async fn find_one(&self, id: &str) -> Result<Product, CatalogError> {
        let pid = parse_id(id)?;
        self.store
            .get(&pid)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id).into())
    }

    #[instrument(skip(self, patch, image), fields(has_image = image.is_some()), err)]
    pub async fn update(
        &self,
        id: &str,
        mut patch: ProductFields,
        image: Option<UploadedFile>,
    ) -> Result<Product, CatalogError> {
        let pid = parse_id(id)?;
        patch.validate(false)?;

        if let Some(file) = image {
            // Only write the file for a product that exists.
            if self.store.get(&pid).await?.is_none() {
                return Err(DomainError::not_found("Product", id).into());
            }
            patch.image = Some(self.images.store(&PRODUCT_IMAGES, file).await?);
        }

        let product = self
            .store
            .update(&pid, patch, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    #[instrument(skip(self), err)]
    pub async fn remove(&self, id: &str) -> Result<Product, CatalogError> {
        let pid = parse_id(id)?;
        let product = self
            .store
            .remove(&pid)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        info!(product_id = %product.id, "product removed");
        Ok(product)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, CatalogError> {
        let products = self.store.list().await?;
        Ok(StatsSnapshot::from_products(&products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProductStore;
    use rigshop_catalog::SpecValue;
    use uuid::Uuid;

    fn service() -> (CatalogService, std::path::PathBuf) {
        let root = std::env::temp_dir().join(format!("rigshop-catalog-{}", Uuid::new_v4()));
        let svc =
            CatalogService::new(Arc::new(InMemoryProductStore::new()), ImageStorage::new(&root));
        (svc, root)
    }

    fn fields(name: &str, price: f64, stock: i64) -> ProductFields {
        ProductFields {
            name: Some(name.into()),
            price: Some(price),
            stock: Some(stock),
            ..Default::default()
        }
    }

    fn png() -> UploadedFile {
        UploadedFile {
            file_name: "cover.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }
    }

    fn is_not_found(err: &CatalogError) -> bool {
        matches!(err, CatalogError::Store(StoreError::Domain(DomainError::NotFound { .. })))
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let (svc, _) = service();
        let created = svc.create(fields("Noctua NH-D15", 110.0, 4), None).await.unwrap();

        assert_eq!(svc.find_one(&created.id.to_string()).await.unwrap(), created);

        let patch = ProductFields {
            price: Some(99.0),
            ..Default::default()
        };
        let updated = svc.update(&created.id.to_string(), patch, None).await.unwrap();
        assert_eq!(updated.price, 99.0);
        assert_eq!(updated.name, "Noctua NH-D15");

        let removed = svc.remove(&created.id.to_string()).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(is_not_found(&svc.find_one(&created.id.to_string()).await.unwrap_err()));
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_not_found() {
        let (svc, _) = service();
        assert!(is_not_found(&svc.find_one("garbage").await.unwrap_err()));
        assert!(is_not_found(&svc.remove(&ProductId::new().to_string()).await.unwrap_err()));
        assert!(is_not_found(
            &svc.update("garbage", ProductFields::default(), None).await.unwrap_err()
        ));
    }

    #[tokio::test]
    async fn create_with_image_stores_relative_path() {
        let (svc, root) = service();
        let p = svc.create(fields("Lian Li O11", 150.0, 2), Some(png())).await.unwrap();

        let image = p.image.unwrap();
        assert!(image.starts_with("products/") && image.ends_with(".png"));
        assert!(root.join(&image).exists());
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_fields_do_not_write_the_image() {
        let (svc, root) = service();
        let err = svc
            .create(fields("", 150.0, 2), Some(png()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Domain(DomainError::Validation(_)))));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn disallowed_image_type_is_rejected() {
        let (svc, _) = service();
        let mut file = png();
        file.content_type = "image/gif".into();
        let err = svc.create(fields("Case", 50.0, 1), Some(file)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Upload(UploadError::InvalidFileType(_))));
    }

    #[tokio::test]
    async fn find_all_filters_and_rejects_bad_prices() {
        let (svc, _) = service();
        let mut gpu = fields("RTX 4080", 1200.0, 3);
        gpu.category = Some("GPU".into());
        gpu.specs.insert("vram".into(), SpecValue::Text("16GB".into()));
        svc.create(gpu, None).await.unwrap();
        svc.create(fields("Budget case", 40.0, 9), None).await.unwrap();

        let out = svc
            .find_all(CatalogParams {
                category: Some("GPU".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].specs["vram"], SpecValue::Text("16GB".into()));

        let err = svc
            .find_all(CatalogParams {
                max_price: Some("lots".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Domain(DomainError::Validation(_)))));
    }

    #[tokio::test]
    async fn stats_reflect_the_store() {
        let (svc, _) = service();
        svc.create(fields("A", 10.0, 0), None).await.unwrap();
        svc.create(fields("B", 20.0, 3), None).await.unwrap();
        svc.create(fields("C", 5.0, 100), None).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.total_value, 560.0);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.low_stock.len(), 2);
        assert_eq!(stats.daily_data.len(), 7);
    }
}
