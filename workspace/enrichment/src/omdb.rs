//! OMDb lookup-by-id response handling.

use serde::Deserialize;

use crate::error::Result;
use crate::lookup::MovieMetadata;

/// Placeholder OMDb uses for missing values.
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MovieRecord {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    poster: Option<String>,
}

/// Outcome of an OMDb request: either a movie or the service's own error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieResponse {
    Found(MovieMetadata),
    Missing(String),
}

pub fn parse_movie_response(body: &str) -> Result<MovieResponse> {
    let record: MovieRecord = serde_json::from_str(body)?;

    if record.response != "True" {
        return Ok(MovieResponse::Missing(
            record
                .error
                .unwrap_or_else(|| "Movie not found!".to_string()),
        ));
    }

    Ok(MovieResponse::Found(MovieMetadata {
        title: record.title,
        director: record.director,
        genre: record.genre,
        plot: record.plot,
        poster_url: record
            .poster
            .filter(|p| !p.is_empty() && p != NOT_AVAILABLE),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_found_movie() {
        let body = r#"{
            "Title": "Alien",
            "Year": "1979",
            "Director": "Ridley Scott",
            "Genre": "Horror, Sci-Fi",
            "Plot": "The crew of a commercial spacecraft encounters a deadly lifeform.",
            "Poster": "https://m.media-amazon.com/images/alien.jpg",
            "Response": "True"
        }"#;

        let MovieResponse::Found(movie) = parse_movie_response(body).unwrap() else {
            panic!("expected a movie");
        };
        assert_eq!(movie.title, "Alien");
        assert_eq!(movie.director, "Ridley Scott");
        assert_eq!(movie.genre, "Horror, Sci-Fi");
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/alien.jpg")
        );
    }

    #[test]
    fn test_poster_not_available() {
        let body = r#"{"Title": "Obscure", "Poster": "N/A", "Response": "True"}"#;
        let MovieResponse::Found(movie) = parse_movie_response(body).unwrap() else {
            panic!("expected a movie");
        };
        assert_eq!(movie.poster_url, None);
    }

    #[test]
    fn test_error_response() {
        let body = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        assert_eq!(
            parse_movie_response(body).unwrap(),
            MovieResponse::Missing("Incorrect IMDb ID.".to_string())
        );
    }
}
