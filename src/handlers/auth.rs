use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{CurrentUser, issue_session, revoke_session};
use crate::error::ApiError;
use crate::handlers::profile::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Username (must be unique)
    #[validate(length(min = 4, max = 20))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
    /// Must repeat `password`
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// A fresh session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Send as `Authorization: Bearer <token>`
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RegisterRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    trace!("Entering register function");

    let user = state
        .store
        .register(&request.username, &request.password)
        .await?;

    info!("Account created: {} (id {})", user.username, user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            UserResponse::from(user),
            "Your account has been created! You are now able to log in",
        )),
    ))
}

/// Log in and receive a session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<LoginResponse>>), ApiError> {
    trace!("Entering login function");

    let user = state
        .store
        .verify_credential(&request.username, &request.password)
        .await?;
    let token = issue_session(&state.sessions, user.id).await;

    info!("User {} logged in", user.id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            LoginResponse {
                token,
                user: UserResponse::from(user),
            },
            "Logged in successfully",
        )),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<ApiResponse<String>>), ApiError> {
    revoke_session(&state.sessions, &current.token).await;
    debug!("User {} logged out", current.id);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("User {} logged out", current.id),
            "You have been logged out",
        )),
    ))
}
