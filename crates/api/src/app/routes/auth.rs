use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use rigshop_auth::{Credentials, Registration};
use rigshop_infra::AccessToken;

use crate::app::dto::ProfileResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Public account endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Endpoints that need a verified bearer token.
pub fn protected_router() -> Router {
    Router::new().route("/me", get(me))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<AccessToken>), ApiError> {
    let Json(registration) = body?;
    let token = services.accounts.register(registration).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Json(credentials) = body?;
    Ok(Json(services.accounts.login(credentials).await?))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = services.accounts.profile(&principal.user_id()).await?;
    Ok(Json(user.into()))
}
