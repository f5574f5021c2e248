//! Bearer-token sessions.
//!
//! A session is an entry in the `moka` cache mapping an opaque token to the
//! user id; expiry is the cache's time-to-live.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use moka::future::Cache;
use rand::{Rng, distributions::Alphanumeric};
use std::time::Duration;
use store::UserId;
use tracing::{debug, trace};

use crate::error::ApiError;
use crate::schemas::AppState;

pub const TOKEN_LEN: usize = 48;

pub fn session_cache(ttl: Duration) -> Cache<String, UserId> {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(ttl)
        .build()
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub async fn issue_session(sessions: &Cache<String, UserId>, user_id: UserId) -> String {
    let token = new_token();
    sessions.insert(token.clone(), user_id).await;
    debug!("Issued session for user {}", user_id);
    token
}

pub async fn revoke_session(sessions: &Cache<String, UserId>, token: &str) {
    sessions.invalidate(token).await;
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Please log in to access this page"))?;

        match state.sessions.get(token).await {
            Some(id) => {
                trace!("Authenticated request for user {}", id);
                Ok(CurrentUser {
                    id,
                    token: token.to_string(),
                })
            }
            None => Err(ApiError::unauthorized("Session expired or invalid")),
        }
    }
}
