use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::{Kind, entities::catalog_item};
use serde::{Deserialize, Serialize};
use store::{ListOrder, NewItem, cover_filename};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::parse_kind;
use crate::handlers::reviews::ReviewResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Items per kind on the landing page.
pub const FEATURED_PER_KIND: u64 = 5;

/// Request body for adding an item to a collection
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Author, director or studio depending on the kind
    #[validate(length(min = 1, max = 50))]
    pub creator: String,
    #[validate(length(min = 1, max = 50))]
    pub genre: String,
    pub synopsis: Option<String>,
}

/// Query parameters for browsing a collection
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct BrowseQuery {
    /// Maximum number of items
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// Newest first instead of shuffled
    pub newest: Option<bool>,
}

/// Catalog item response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: i32,
    /// book, movie or game
    pub kind: String,
    pub title: String,
    pub creator: String,
    /// What `creator` means for this kind: author, director or studio
    pub creator_field: String,
    pub genre: String,
    pub synopsis: Option<String>,
    /// Filename under `covers/`
    pub cover_image: String,
}

impl From<catalog_item::Model> for ItemResponse {
    fn from(model: catalog_item::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind.to_string(),
            creator_field: model.kind.creator_field().to_string(),
            title: model.title,
            creator: model.creator,
            genre: model.genre,
            synopsis: model.synopsis,
            cover_image: model.cover_image,
        }
    }
}

/// An item with its reviews
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemDetailResponse {
    pub item: ItemResponse,
    pub reviews: Vec<ReviewResponse>,
}

/// Random picks from every collection
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct FeaturedResponse {
    pub books: Vec<ItemResponse>,
    pub movies: Vec<ItemResponse>,
    pub games: Vec<ItemResponse>,
}

/// Random items from every collection
#[utoipa::path(
    get,
    path = "/api/v1/featured",
    tag = "catalog",
    responses(
        (status = 200, description = "Featured items", body = ApiResponse<FeaturedResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_featured(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<FeaturedResponse>>), ApiError> {
    let mut featured = FeaturedResponse::default();
    for (kind, items) in state.store.featured(FEATURED_PER_KIND).await? {
        let items = items.into_iter().map(ItemResponse::from).collect();
        match kind {
            Kind::Book => featured.books = items,
            Kind::Movie => featured.movies = items,
            Kind::Game => featured.games = items,
        }
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(featured, "Featured items retrieved successfully")),
    ))
}

/// Browse one collection
#[utoipa::path(
    get,
    path = "/api/v1/catalog/{kind}",
    tag = "catalog",
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        BrowseQuery,
    ),
    responses(
        (status = 200, description = "Items retrieved successfully", body = ApiResponse<Vec<ItemResponse>>),
        (status = 404, description = "Unknown kind", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_items(
    Path(kind): Path<String>,
    Valid(Query(query)): Valid<Query<BrowseQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ItemResponse>>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let order = if query.newest.unwrap_or(false) {
        ListOrder::Newest
    } else {
        ListOrder::Random
    };

    let items = state.store.list_items(kind, order, query.limit).await?;
    debug!("Returning {} {} items", items.len(), kind);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            items.into_iter().map(ItemResponse::from).collect(),
            "Items retrieved successfully",
        )),
    ))
}

/// Add an item to a collection
///
/// When no cover is uploaded, a cover previously downloaded for the same title
/// is picked up; otherwise the placeholder is used.
#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}",
    tag = "catalog",
    security(("bearer" = [])),
    params(
        ("kind" = String, Path, description = "book, movie or game"),
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created successfully", body = ApiResponse<ItemResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Unknown kind", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(user_id = current.id, title = %request.title))]
pub async fn create_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(kind): Path<String>,
    Valid(Json(request)): Valid<Json<CreateItemRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ItemResponse>>), ApiError> {
    let kind = parse_kind(&kind)?;

    let cover = if state.artwork.has_cover(&request.title).await {
        trace!("Found cover on disk for '{}'", request.title);
        Some(cover_filename(&request.title))
    } else {
        None
    };

    let created = state
        .store
        .create_item(NewItem {
            kind,
            title: request.title,
            creator: request.creator,
            genre: request.genre,
            synopsis: request.synopsis,
            cover,
        })
        .await?;

    info!("User {} added {} {}", current.id, kind, created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ItemResponse::from(created),
            format!("{} added successfully!", capitalized(kind)),
        )),
    ))
}

/// Get one item with its reviews
#[utoipa::path(
    get,
    path = "/api/v1/catalog/{kind}/{item_id}",
    tag = "catalog",
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item retrieved successfully", body = ApiResponse<ItemDetailResponse>),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_item(
    Path((kind, item_id)): Path<(String, i32)>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<ItemDetailResponse>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let item = state.store.get_item(kind, item_id).await?;
    let reviews = state.store.list_reviews_for_item(kind, item_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            ItemDetailResponse {
                item: ItemResponse::from(item),
                reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
            },
            "Item retrieved successfully",
        )),
    ))
}

/// Delete an item and all of its reviews (administrator only)
#[utoipa::path(
    delete,
    path = "/api/v1/catalog/{kind}/{item_id}",
    tag = "catalog",
    security(("bearer" = [])),
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not the administrator", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn delete_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((kind, item_id)): Path<(String, i32)>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let removed = state.store.delete_item(kind, item_id, current.id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("{} {} deleted with {} reviews", kind, item_id, removed),
            format!("{} deleted successfully!", capitalized(kind)),
        )),
    ))
}

/// Upload raw image bytes as an item's cover
///
/// Open to every logged-in user, like adding items: covers are shared catalog
/// artwork with no owner. The file is named after the title, so a new upload
/// replaces the previous cover.
#[utoipa::path(
    put,
    path = "/api/v1/catalog/{kind}/{item_id}/cover",
    tag = "catalog",
    security(("bearer" = [])),
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Cover updated; any logged-in user may replace it", body = ApiResponse<ItemResponse>),
        (status = 400, description = "Empty upload", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Failed to store image", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, body), fields(user_id = current.id, size = body.len()))]
pub async fn upload_cover(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((kind, item_id)): Path<(String, i32)>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<ItemResponse>>), ApiError> {
    let kind = parse_kind(&kind)?;
    if body.is_empty() {
        return Err(ApiError::invalid_field("Cover image is empty"));
    }

    let item = state.store.get_item(kind, item_id).await?;
    let filename = state.artwork.write_cover(&item.title, &body).await?;
    let updated = state.store.set_cover(kind, item_id, &filename).await?;

    info!("User {} set cover of {} {}", current.id, kind, item_id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            ItemResponse::from(updated),
            "Cover updated successfully",
        )),
    ))
}

fn capitalized(kind: Kind) -> String {
    let name = kind.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
