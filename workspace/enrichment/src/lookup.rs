use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Book details as published by the lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub subjects: Vec<String>,
    pub excerpts: Vec<String>,
    pub cover_url: Option<String>,
}

/// Movie details as published by the lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMetadata {
    pub title: String,
    pub director: String,
    pub genre: String,
    pub plot: String,
    pub poster_url: Option<String>,
}

/// Source of item metadata and artwork.
///
/// `Ok(None)` means the service answered but knows nothing about the key.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup_book_by_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>>;

    async fn lookup_movie_by_external_id(&self, external_id: &str)
    -> Result<Option<MovieMetadata>>;

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
