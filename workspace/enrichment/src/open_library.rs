//! Open Library `api/books` response handling.
//!
//! The endpoint answers with an object keyed by `ISBN:<isbn>`; an unknown
//! ISBN yields an empty object.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::lookup::BookMetadata;

#[derive(Debug, Deserialize)]
struct BookRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<Named>,
    #[serde(default)]
    subjects: Vec<Named>,
    #[serde(default)]
    excerpts: Vec<Excerpt>,
    #[serde(default)]
    cover: Option<Cover>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Excerpt {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Cover {
    medium: Option<String>,
}

pub fn bibkey(isbn: &str) -> String {
    format!("ISBN:{}", isbn)
}

pub fn parse_book_response(body: &str, isbn: &str) -> Result<Option<BookMetadata>> {
    let mut records: HashMap<String, BookRecord> = serde_json::from_str(body)?;

    Ok(records.remove(&bibkey(isbn)).map(|record| BookMetadata {
        title: record.title,
        authors: record.authors.into_iter().map(|a| a.name).collect(),
        subjects: record.subjects.into_iter().map(|s| s.name).collect(),
        excerpts: record.excerpts.into_iter().map(|e| e.text).collect(),
        cover_url: record
            .cover
            .and_then(|c| c.medium)
            .filter(|url| !url.is_empty()),
    }))
}
