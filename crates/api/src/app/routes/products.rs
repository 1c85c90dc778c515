use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use rigshop_catalog::{
    CatalogParams, CouponCheck, Order, OrderReceipt, Product, StatsSnapshot, check_coupon,
};

use crate::app::dto::{CouponRequest, ProductForm};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/stats", get(stats))
        .route("/coupon", post(coupon))
        .route("/checkout", post(checkout))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(remove_product),
        )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    form: ProductForm,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = services.catalog.create(form.fields, form.image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.catalog.find_all(params).await?))
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<StatsSnapshot>, ApiError> {
    Ok(Json(services.catalog.stats().await?))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(services.catalog.find_one(&id).await?))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(services.catalog.update(&id, form.fields, form.image).await?))
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(services.catalog.remove(&id).await?))
}

pub async fn coupon(
    body: Result<Json<CouponRequest>, JsonRejection>,
) -> Result<Json<CouponCheck>, ApiError> {
    let Json(req) = body?;
    Ok(Json(check_coupon(&req.code)))
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Order>, JsonRejection>,
) -> Result<Json<OrderReceipt>, ApiError> {
    let Json(order) = body?;
    Ok(Json(services.checkout.checkout(order).await?))
}
