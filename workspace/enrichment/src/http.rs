use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{LookupError, Result};
use crate::lookup::{BookMetadata, MetadataLookup, MovieMetadata};
use crate::omdb::{MovieResponse, parse_movie_response};
use crate::open_library::{bibkey, parse_book_response};

pub const DEFAULT_OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
pub const DEFAULT_OMDB_URL: &str = "http://www.omdbapi.com";

/// Endpoints and credentials for the public metadata services.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub open_library_url: String,
    pub omdb_url: String,
    pub omdb_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            open_library_url: DEFAULT_OPEN_LIBRARY_URL.to_string(),
            omdb_url: DEFAULT_OMDB_URL.to_string(),
            omdb_api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`MetadataLookup`] backed by Open Library (books) and OMDb (movies).
#[derive(Debug, Clone)]
pub struct HttpMetadataLookup {
    client: Client,
    config: LookupConfig,
}

impl HttpMetadataLookup {
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let body = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl MetadataLookup for HttpMetadataLookup {
    #[instrument(skip(self))]
    async fn lookup_book_by_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        let url = format!(
            "{}/api/books",
            self.config.open_library_url.trim_end_matches('/')
        );
        let key = bibkey(isbn);
        let body = self
            .get_text(
                &url,
                &[("bibkeys", key.as_str()), ("jscmd", "data"), ("format", "json")],
            )
            .await?;
        parse_book_response(&body, isbn)
    }

    #[instrument(skip(self))]
    async fn lookup_movie_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<MovieMetadata>> {
        let api_key = self
            .config
            .omdb_api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("OMDb"))?;

        let url = format!("{}/", self.config.omdb_url.trim_end_matches('/'));
        let body = self
            .get_text(&url, &[("i", external_id), ("apikey", api_key)])
            .await?;

        match parse_movie_response(&body)? {
            MovieResponse::Found(movie) => Ok(Some(movie)),
            MovieResponse::Missing(reason) => {
                debug!("OMDb has no record for {}: {}", external_id, reason);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        debug!("Fetched {} bytes of artwork", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_movie_lookup_without_key_fails_before_any_request() {
        let lookup = HttpMetadataLookup::new(LookupConfig {
            omdb_url: "http://127.0.0.1:9".to_string(),
            ..LookupConfig::default()
        })
        .unwrap();

        let err = lookup
            .lookup_movie_by_external_id("tt0078748")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::MissingApiKey("OMDb")));
    }
}
