use crate::config::{Settings, build_app_state};
use crate::router::create_router;
use crate::schemas::AppState;
use async_trait::async_trait;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use enrichment::{BookMetadata, Enricher, MetadataLookup, MovieMetadata};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use store::ArtworkStorage;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Metadata service that knows exactly one book and one movie.
pub struct FixtureLookup;

pub const FIXTURE_ISBN: &str = "9780441013593";
pub const FIXTURE_IMDB_ID: &str = "tt0078748";

#[async_trait]
impl MetadataLookup for FixtureLookup {
    async fn lookup_book_by_isbn(&self, isbn: &str) -> enrichment::Result<Option<BookMetadata>> {
        Ok((isbn == FIXTURE_ISBN).then(|| BookMetadata {
            title: "Dune".to_string(),
            authors: vec!["Frank Herbert".to_string()],
            subjects: vec![
                "Science fiction".to_string(),
                "Ecology".to_string(),
                "Politics".to_string(),
                "Religion".to_string(),
            ],
            excerpts: vec!["A beginning is the time for taking the most delicate care".to_string()],
            cover_url: Some("https://covers.example/dune-M.jpg".to_string()),
        }))
    }

    async fn lookup_movie_by_external_id(
        &self,
        external_id: &str,
    ) -> enrichment::Result<Option<MovieMetadata>> {
        Ok((external_id == FIXTURE_IMDB_ID).then(|| MovieMetadata {
            title: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            genre: "Horror, Sci-Fi".to_string(),
            plot: "The crew of a commercial spacecraft encounters a deadly lifeform.".to_string(),
            poster_url: None,
        }))
    }

    async fn fetch_image(&self, _url: &str) -> enrichment::Result<Vec<u8>> {
        Ok(b"fixture jpeg".to_vec())
    }
}

/// Test state plus the temporary media directory backing it.
pub struct TestContext {
    pub state: AppState,
    pub media: TempDir,
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> TestContext {
    let db = setup_test_db().await;
    let media = tempfile::tempdir().expect("Failed to create media directory");

    let settings = Settings {
        media_root: media.path().display().to_string(),
        session_ttl_secs: 3600,
        password_rounds: 1_000,
        omdb_api_key: None,
        lookup_timeout_secs: 1,
        open_library_url: String::new(),
        omdb_url: String::new(),
    };
    let enricher = Enricher::new(Arc::new(FixtureLookup), ArtworkStorage::new(media.path()));

    let state = build_app_state(db, &settings, enricher)
        .await
        .expect("Failed to build app state");

    TestContext { state, media }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> (Router, TestContext) {
    let _guard = init_test_tracing();

    let context = setup_test_app_state().await;
    let router = create_router(context.state.clone());
    (router, context)
}

/// `Authorization` header for a session token.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token"),
    )
}
