use axum::http::StatusCode;
use model::Kind;
use tracing::warn;

use crate::error::ApiError;

pub mod auth;
pub mod catalog;
pub mod fallback;
pub mod health;
pub mod lookup;
pub mod profile;
pub mod reviews;

/// Resolves the `:kind` path segment; unknown kinds are reported as missing pages.
pub fn parse_kind(raw: &str) -> Result<Kind, ApiError> {
    raw.parse::<Kind>().map_err(|e| {
        warn!("Rejected request for {}", e);
        ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Invalid item type.")
    })
}
