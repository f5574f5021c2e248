//! Persistence and consistency rules for the media catalog.
//!
//! The [`Store`] context owns the database connection and the credential
//! hasher. Every mutating operation runs in a single transaction; dropping the
//! transaction without committing rolls it back.

use sea_orm::DatabaseConnection;

pub mod artwork;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod policy;
pub mod reviews;

#[cfg(test)]
pub(crate) mod testing;

pub use artwork::{ArtworkStorage, cover_filename, sanitize_upload_name};
pub use catalog::{ListOrder, NewItem};
pub use credentials::CredentialHasher;
pub use error::{Result, StoreError};
pub use model::Kind;

pub type UserId = i32;
pub type ItemId = i32;
pub type ReviewId = i32;

/// Handle to the catalog, identity and review collections.
#[derive(Clone, Debug)]
pub struct Store {
    db: DatabaseConnection,
    hasher: CredentialHasher,
}

impl Store {
    pub fn new(db: DatabaseConnection, hasher: CredentialHasher) -> Self {
        Self { db, hasher }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }
}
