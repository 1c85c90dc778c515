//! Request/response DTOs and body extraction helpers.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use rigshop_auth::{Role, User};
use rigshop_catalog::ProductFields;
use rigshop_core::{DomainError, FieldViolation, UserId};
use rigshop_infra::UploadedFile;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    #[serde(default)]
    pub code: String,
}

/// Product create/edit body: the writable fields plus an optional cover image.
///
/// Accepts `multipart/form-data` (fields as strings, cover image in the `image`
/// part) or a plain JSON object.
#[derive(Debug)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub image: Option<UploadedFile>,
}

/// Form fields carried as integers.
const INTEGER_FIELDS: &[&str] = &["stock", "sold", "points"];
/// Form fields carried as decimal numbers.
const NUMBER_FIELDS: &[&str] = &["price", "cudaCores", "memorySlot"];
/// Form fields that may repeat to build a list.
const LIST_FIELDS: &[&str] = &["gallery", "colors"];

#[axum::async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|r| ApiError::BadRequest {
                    status: r.status(),
                    message: r.body_text(),
                })?;
            read_multipart(multipart).await
        } else {
            let Json(fields) = Json::<ProductFields>::from_request(req, state).await?;
            Ok(Self { fields, image: None })
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut object = Map::new();
    let mut lists: Vec<(&'static str, Vec<Value>)> =
        LIST_FIELDS.iter().map(|name| (*name, Vec::new())).collect();
    let mut violations = Vec::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(|n| n.trim_end_matches("[]").to_string()) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was picked.
            if !bytes.is_empty() {
                image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let raw = field.text().await?;
        if let Some((_, values)) = lists.iter_mut().find(|(list, _)| *list == name) {
            values.push(Value::String(raw));
        } else if let Some(value) = form_value(&name, raw, &mut violations) {
            object.insert(name, value);
        }
    }
    DomainError::check(violations)?;

    for (name, values) in lists {
        if !values.is_empty() {
            object.insert(name.to_string(), Value::Array(values));
        }
    }

    let fields = serde_json::from_value::<ProductFields>(Value::Object(object))
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(ProductForm { fields, image })
}

/// Convert one text form field to its JSON value. Blank numeric fields are
/// treated as absent.
fn form_value(name: &str, raw: String, violations: &mut Vec<FieldViolation>) -> Option<Value> {
    let trimmed = raw.trim();
    if INTEGER_FIELDS.contains(&name) {
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) => Some(Value::from(n)),
            Err(_) => {
                violations.push(FieldViolation::new(
                    name,
                    format!("{name} must be an integer number"),
                ));
                None
            }
        }
    } else if NUMBER_FIELDS.contains(&name) {
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Some(Value::Number(n)),
            None => {
                violations.push(FieldViolation::new(name, format!("{name} must be a number")));
                None
            }
        }
    } else {
        Some(Value::String(raw))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Public view of the signed-in account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
