//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and body extraction
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use rigshop_auth::TokenVerifier;
use rigshop_infra::StoreError;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Request bodies above this are cut off before the per-file checks run.
/// Leaves room for a 5 MiB image plus the other form fields.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &Config) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services, config))
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>, config: &Config) -> Router {
    let verifier: Arc<dyn TokenVerifier> = services.tokens.clone();
    let auth_state = middleware::AuthState { tokens: verifier };

    // Protected routes: require a valid session token.
    let protected = routes::auth::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/products", routes::products::router())
        .nest("/auth", routes::auth::router().merge(protected))
        .nest_service("/uploads", ServeDir::new(&config.upload_dest))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
