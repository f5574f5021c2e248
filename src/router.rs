use crate::handlers::{
    auth::{login, logout, register},
    catalog::{create_item, delete_item, get_featured, get_item, list_items, upload_cover},
    fallback::not_found,
    health::health_check,
    lookup::{lookup_book, lookup_movie},
    profile::{get_own_profile, get_user_profile, update_own_profile, upload_avatar},
    reviews::{create_review, delete_review, list_reviews},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(state.artwork.root());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Registration and sessions
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        // Profiles
        .route("/api/v1/profile", get(get_own_profile).put(update_own_profile))
        .route("/api/v1/profile/avatar/:filename", put(upload_avatar))
        .route("/api/v1/users/:user_id", get(get_user_profile))
        // Catalog
        .route("/api/v1/featured", get(get_featured))
        .route("/api/v1/catalog/:kind", get(list_items).post(create_item))
        .route("/api/v1/catalog/:kind/:item_id", get(get_item).delete(delete_item))
        .route("/api/v1/catalog/:kind/:item_id/cover", put(upload_cover))
        // Reviews
        .route(
            "/api/v1/catalog/:kind/:item_id/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/api/v1/catalog/:kind/:item_id/reviews/:review_id",
            delete(delete_review),
        )
        // Metadata enrichment
        .route("/api/v1/lookup/book/:isbn", post(lookup_book))
        .route("/api/v1/lookup/movie/:imdb_id", post(lookup_movie))
        // Covers and avatars
        .nest_service("/media", media)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
