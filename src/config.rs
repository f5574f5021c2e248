use anyhow::Result;
use config::{Config, Environment};
use enrichment::{Enricher, HttpMetadataLookup, LookupConfig};
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use store::{ArtworkStorage, CredentialHasher, Store};
use tracing::{debug, info};

use crate::auth::session_cache;
use crate::schemas::AppState;

/// Runtime settings read from `MEDIASHELF_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding `covers/` and `avatars/`
    pub media_root: String,
    pub session_ttl_secs: u64,
    pub password_rounds: u32,
    pub omdb_api_key: Option<String>,
    pub lookup_timeout_secs: u64,
    pub open_library_url: String,
    pub omdb_url: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder())
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .set_default("media_root", "media")?
            .set_default("session_ttl_secs", 86_400_i64)?
            .set_default("password_rounds", i64::from(CredentialHasher::DEFAULT_ROUNDS))?
            .set_default("lookup_timeout_secs", 10_i64)?
            .set_default("open_library_url", enrichment::http::DEFAULT_OPEN_LIBRARY_URL)?
            .set_default("omdb_url", enrichment::http::DEFAULT_OMDB_URL)?
            .add_source(Environment::with_prefix("MEDIASHELF").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig {
            open_library_url: self.open_library_url.clone(),
            omdb_url: self.omdb_url.clone(),
            omdb_api_key: self.omdb_api_key.clone().filter(|key| !key.is_empty()),
            timeout: Duration::from_secs(self.lookup_timeout_secs),
        }
    }
}

/// Assemble application state around an open database connection
pub async fn build_app_state(
    db: DatabaseConnection,
    settings: &Settings,
    enricher: Enricher,
) -> Result<AppState> {
    let artwork = ArtworkStorage::new(&settings.media_root);
    artwork.ensure_dirs().await?;

    let store = Store::new(db, CredentialHasher::new(settings.password_rounds));
    let sessions = session_cache(Duration::from_secs(settings.session_ttl_secs));

    Ok(AppState {
        store,
        sessions,
        artwork,
        enricher,
    })
}

/// Initialize application configuration and state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    let settings = Settings::load()?;
    debug!("Loaded settings: media_root={}", settings.media_root);

    // Connect to database
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let lookup = HttpMetadataLookup::new(settings.lookup_config())?;
    let enricher = Enricher::new(
        Arc::new(lookup),
        ArtworkStorage::new(&settings.media_root),
    );

    build_app_state(db, &settings, enricher).await
}
