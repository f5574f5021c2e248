use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::user;
use serde::{Deserialize, Serialize};
use store::{UserId, policy};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::reviews::ReviewResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Public view of an account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub bio: Option<String>,
    /// Filename under `avatars/`
    pub avatar: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            bio: model.bio,
            avatar: model.avatar,
        }
    }
}

/// A user together with everything they reviewed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    /// Newest first, across all kinds
    pub reviews: Vec<ReviewResponse>,
    pub is_admin: bool,
}

/// Request body for updating the caller's profile
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// Filename of an avatar already uploaded
    #[validate(length(min = 1))]
    pub avatar: Option<String>,
}

async fn load_profile(state: &AppState, user_id: UserId) -> Result<ProfileResponse, ApiError> {
    let user = state.store.get_user(user_id).await?;
    let reviews = state.store.list_reviews_for_user(user_id).await?;
    debug!("Loaded profile of user {} with {} reviews", user_id, reviews.len());

    Ok(ProfileResponse {
        is_admin: policy::is_admin(user.id),
        user: UserResponse::from(user),
        reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
    })
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profiles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ApiError> {
    trace!("Entering get_own_profile function");
    let profile = load_profile(&state, current.id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(profile, "Profile retrieved successfully")),
    ))
}

/// Update the caller's bio and/or avatar
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profiles",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(user_id = current.id))]
pub async fn update_own_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let updated = state
        .store
        .update_profile(current.id, request.bio, request.avatar)
        .await?;

    info!("User {} updated their profile", current.id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            UserResponse::from(updated),
            "Your profile has been updated!",
        )),
    ))
}

/// Upload raw image bytes as the caller's avatar
///
/// The filename is sanitized and must end in `.jpg`, `.jpeg` or `.png`.
#[utoipa::path(
    put,
    path = "/api/v1/profile/avatar/{filename}",
    tag = "profiles",
    security(("bearer" = [])),
    params(
        ("filename" = String, Path, description = "Original file name of the image"),
    ),
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Unsupported file type", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Failed to store image", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, body), fields(user_id = current.id, size = body.len()))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(filename): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::invalid_field("Avatar image is empty"));
    }

    let stored = state.artwork.write_avatar(&filename, &body).await?;
    let updated = state
        .store
        .update_profile(current.id, None, Some(stored))
        .await?;

    info!("User {} uploaded avatar '{}'", current.id, updated.avatar);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            UserResponse::from(updated),
            "Your avatar has been updated!",
        )),
    ))
}

/// Get another user's public profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ApiError> {
    let profile = load_profile(&state, user_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(profile, "Profile retrieved successfully")),
    ))
}
