//! Best-effort population of catalog fields from public metadata services.
//!
//! Enrichment runs before, and independently of, item creation: it returns an
//! [`EnrichmentDraft`] that the caller may submit through the store.

pub mod enricher;
pub mod error;
pub mod http;
pub mod lookup;
pub mod omdb;
pub mod open_library;

pub use enricher::{Enricher, EnrichmentDraft};
pub use error::{LookupError, Result};
pub use http::{HttpMetadataLookup, LookupConfig};
pub use lookup::{BookMetadata, MetadataLookup, MovieMetadata};
