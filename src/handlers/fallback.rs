use axum::http::Uri;
use tracing::debug;

use crate::error::ApiError;

/// Catch-all for paths that match no route.
pub async fn not_found(uri: Uri) -> ApiError {
    debug!("No route for {}", uri);
    ApiError::not_found(format!("No resource at {}", uri.path()))
}
