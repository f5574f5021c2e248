use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use enrichment::EnrichmentDraft;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Pre-filled values for the create-item form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DraftResponse {
    /// book or movie
    pub kind: String,
    /// Whether the service knew the identifier
    pub found: bool,
    pub title: String,
    pub creator: String,
    pub genre: String,
    pub synopsis: String,
    /// Remote artwork location
    pub cover_url: Option<String>,
    /// Set when the artwork was saved under `covers/`
    pub cover_image: Option<String>,
}

impl From<EnrichmentDraft> for DraftResponse {
    fn from(draft: EnrichmentDraft) -> Self {
        Self {
            kind: draft.kind.to_string(),
            found: draft.found,
            title: draft.title,
            creator: draft.creator,
            genre: draft.genre,
            synopsis: draft.synopsis,
            cover_url: draft.cover_url,
            cover_image: draft.cover_image,
        }
    }
}

fn draft_response(draft: EnrichmentDraft) -> (StatusCode, Json<ApiResponse<DraftResponse>>) {
    let message = draft.message.clone();
    (
        StatusCode::OK,
        Json(ApiResponse::ok(DraftResponse::from(draft), message)),
    )
}

/// Look up a book on Open Library by ISBN
///
/// Always answers 200; `found` tells whether details were available.
#[utoipa::path(
    post,
    path = "/api/v1/lookup/book/{isbn}",
    tag = "lookup",
    security(("bearer" = [])),
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13"),
    ),
    responses(
        (status = 200, description = "Enrichment draft", body = ApiResponse<DraftResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn lookup_book(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(isbn): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<DraftResponse>>), ApiError> {
    let draft = state.enricher.enrich_book(isbn.trim()).await;
    debug!("Book lookup for {} found: {}", isbn, draft.found);
    Ok(draft_response(draft))
}

/// Look up a movie on OMDb by IMDb id
///
/// Always answers 200; `found` tells whether details were available.
#[utoipa::path(
    post,
    path = "/api/v1/lookup/movie/{imdb_id}",
    tag = "lookup",
    security(("bearer" = [])),
    params(
        ("imdb_id" = String, Path, description = "IMDb identifier, e.g. tt0078748"),
    ),
    responses(
        (status = 200, description = "Enrichment draft", body = ApiResponse<DraftResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(user_id = current.id))]
pub async fn lookup_movie(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(imdb_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<DraftResponse>>), ApiError> {
    let draft = state.enricher.enrich_movie(imdb_id.trim()).await;
    debug!("Movie lookup for {} found: {}", imdb_id, draft.found);
    Ok(draft_response(draft))
}
