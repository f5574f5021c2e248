use enrichment::Enricher;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use store::{ArtworkStorage, Store, UserId};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    catalog::{CreateItemRequest, FeaturedResponse, ItemDetailResponse, ItemResponse},
    lookup::DraftResponse,
    profile::{ProfileResponse, UpdateProfileRequest, UserResponse},
    reviews::{CreateReviewRequest, ReviewResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Users, catalog items and reviews
    pub store: Store,
    /// Bearer token to user id
    pub sessions: Cache<String, UserId>,
    /// Cover and avatar files
    pub artwork: ArtworkStorage,
    /// Metadata lookups for the create-item form
    pub enricher: Enricher,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::profile::get_own_profile,
        crate::handlers::profile::update_own_profile,
        crate::handlers::profile::upload_avatar,
        crate::handlers::profile::get_user_profile,
        crate::handlers::catalog::get_featured,
        crate::handlers::catalog::list_items,
        crate::handlers::catalog::create_item,
        crate::handlers::catalog::get_item,
        crate::handlers::catalog::delete_item,
        crate::handlers::catalog::upload_cover,
        crate::handlers::reviews::list_reviews,
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::delete_review,
        crate::handlers::lookup::lookup_book,
        crate::handlers::lookup::lookup_movie,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UserResponse,
            ProfileResponse,
            CreateItemRequest,
            ItemResponse,
            ItemDetailResponse,
            FeaturedResponse,
            CreateReviewRequest,
            ReviewResponse,
            DraftResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and sessions"),
        (name = "profiles", description = "Own and public user profiles"),
        (name = "catalog", description = "Books, movies and games"),
        (name = "reviews", description = "Reviews of catalog items"),
        (name = "lookup", description = "Metadata enrichment for new items"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Mediashelf API",
        description = "Review books, movies and games",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Registers the bearer session scheme used by authenticated endpoints.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
