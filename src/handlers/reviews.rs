use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::review;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::parse_kind;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for reviewing an item
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    /// At least 10 characters
    #[validate(length(min = 10))]
    pub content: String,
}

/// Review response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    /// book, movie or game
    pub kind: String,
    pub content: String,
    pub user_id: i32,
    pub item_id: i32,
}

impl From<review::Model> for ReviewResponse {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind.to_string(),
            content: model.content,
            user_id: model.user_id,
            item_id: model.item_id,
        }
    }
}

/// List reviews of an item, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/catalog/{kind}/{item_id}/reviews",
    tag = "reviews",
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Vec<ReviewResponse>>),
        (status = 404, description = "Unknown kind", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_reviews(
    Path((kind, item_id)): Path<(String, i32)>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ReviewResponse>>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let reviews = state.store.list_reviews_for_item(kind, item_id).await?;
    debug!("Returning {} reviews for {} {}", reviews.len(), kind, item_id);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            reviews.into_iter().map(ReviewResponse::from).collect(),
            "Reviews retrieved successfully",
        )),
    ))
}

/// Review an item
#[utoipa::path(
    post,
    path = "/api/v1/catalog/{kind}/{item_id}/reviews",
    tag = "reviews",
    security(("bearer" = [])),
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created successfully", body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Review too short", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(user_id = current.id))]
pub async fn create_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((kind, item_id)): Path<(String, i32)>,
    Valid(Json(request)): Valid<Json<CreateReviewRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let created = state
        .store
        .create_review(kind, item_id, current.id, &request.content)
        .await?;

    info!("Review {} added to {} {}", created.id, kind, item_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ReviewResponse::from(created),
            "Your review has been added!",
        )),
    ))
}

/// Delete a review (author or administrator)
#[utoipa::path(
    delete,
    path = "/api/v1/catalog/{kind}/{item_id}/reviews/{review_id}",
    tag = "reviews",
    security(("bearer" = [])),
    params(
        ("kind" = String, Path, description = "book, movie or game"),
        ("item_id" = i32, Path, description = "Item ID"),
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not the author or administrator", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn delete_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((kind, item_id, review_id)): Path<(String, i32, i32)>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), ApiError> {
    let kind = parse_kind(&kind)?;

    let existing = state.store.get_review(kind, review_id).await?;
    if existing.item_id != item_id {
        warn!(
            "Review {} belongs to {} {}, not {}",
            review_id, kind, existing.item_id, item_id
        );
        return Err(ApiError::not_found(format!(
            "review with id {} not found",
            review_id
        )));
    }

    state
        .store
        .delete_review(kind, review_id, current.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("Review {} deleted", review_id),
            "Your review has been deleted!",
        )),
    ))
}
