use std::fmt;
use std::sync::Arc;

use model::Kind;
use store::ArtworkStorage;
use tracing::{info, instrument, warn};

use crate::lookup::{BookMetadata, MetadataLookup, MovieMetadata};

/// Number of subjects folded into a book's genre.
pub const MAX_SUBJECTS: usize = 3;

const LIST_SEPARATOR: &str = ", ";

/// Pre-filled values for the create-item form.
///
/// A draft is plain data; nothing is persisted except, possibly, a cover file
/// named after the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentDraft {
    pub kind: Kind,
    pub found: bool,
    pub title: String,
    pub creator: String,
    pub genre: String,
    pub synopsis: String,
    pub cover_url: Option<String>,
    /// Cover filename, set only when artwork was downloaded to disk.
    pub cover_image: Option<String>,
    pub message: String,
}

impl EnrichmentDraft {
    fn not_found(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            found: false,
            title: String::new(),
            creator: String::new(),
            genre: String::new(),
            synopsis: String::new(),
            cover_url: None,
            cover_image: None,
            message: message.into(),
        }
    }

    pub fn from_book(book: BookMetadata) -> Self {
        let genre = book
            .subjects
            .into_iter()
            .take(MAX_SUBJECTS)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        Self {
            kind: Kind::Book,
            found: true,
            title: book.title,
            creator: book.authors.join(LIST_SEPARATOR),
            genre,
            synopsis: book.excerpts.join(LIST_SEPARATOR),
            cover_url: book.cover_url,
            cover_image: None,
            message: String::new(),
        }
    }

    pub fn from_movie(movie: MovieMetadata) -> Self {
        Self {
            kind: Kind::Movie,
            found: true,
            title: movie.title,
            creator: movie.director,
            genre: movie.genre,
            synopsis: movie.plot,
            cover_url: movie.poster_url,
            cover_image: None,
            message: String::new(),
        }
    }
}

/// Turns metadata lookups into drafts, downloading artwork along the way.
///
/// Every failure degrades to a draft with `found == false`; callers never see
/// an error.
#[derive(Clone)]
pub struct Enricher {
    lookup: Arc<dyn MetadataLookup>,
    artwork: ArtworkStorage,
}

impl fmt::Debug for Enricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enricher")
            .field("artwork", &self.artwork)
            .finish_non_exhaustive()
    }
}

impl Enricher {
    pub fn new(lookup: Arc<dyn MetadataLookup>, artwork: ArtworkStorage) -> Self {
        Self { lookup, artwork }
    }

    #[instrument(skip(self))]
    pub async fn enrich_book(&self, isbn: &str) -> EnrichmentDraft {
        match self.lookup.lookup_book_by_isbn(isbn).await {
            Ok(Some(book)) => {
                let draft = EnrichmentDraft::from_book(book);
                let draft = self.attach_cover(draft).await;
                info!("Book details fetched for ISBN {}", isbn);
                draft
            }
            Ok(None) => EnrichmentDraft::not_found(
                Kind::Book,
                format!(
                    "No book details found for ISBN: {}. Please enter the details manually.",
                    isbn
                ),
            ),
            Err(e) => {
                warn!("Book lookup for ISBN {} failed: {}", isbn, e);
                EnrichmentDraft::not_found(
                    Kind::Book,
                    "Error fetching book details. Please try again.",
                )
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn enrich_movie(&self, external_id: &str) -> EnrichmentDraft {
        match self.lookup.lookup_movie_by_external_id(external_id).await {
            Ok(Some(movie)) => {
                let draft = EnrichmentDraft::from_movie(movie);
                let draft = self.attach_cover(draft).await;
                info!("Movie details fetched for {}", external_id);
                draft
            }
            Ok(None) => EnrichmentDraft::not_found(
                Kind::Movie,
                format!("No movie details found for {}.", external_id),
            ),
            Err(e) => {
                warn!("Movie lookup for {} failed: {}", external_id, e);
                EnrichmentDraft::not_found(
                    Kind::Movie,
                    "Error fetching movie details. Please try again.",
                )
            }
        }
    }

    /// Downloads the draft's artwork into `covers/` under the title-derived name.
    async fn attach_cover(&self, mut draft: EnrichmentDraft) -> EnrichmentDraft {
        let Some(url) = draft.cover_url.clone() else {
            draft.message = "Details fetched successfully. No cover found.".to_string();
            return draft;
        };

        let stored = match self.lookup.fetch_image(&url).await {
            Ok(bytes) => self
                .artwork
                .write_cover(&draft.title, &bytes)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match stored {
            Ok(filename) => {
                draft.cover_image = Some(filename);
                draft.message = "Details and cover fetched successfully.".to_string();
            }
            Err(reason) => {
                warn!("Could not store cover from {}: {}", url, reason);
                draft.message =
                    "Details fetched successfully. Error downloading cover.".to_string();
            }
        }
        draft
    }
}
