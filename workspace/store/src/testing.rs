use migration::{Migrator, MigratorTrait};
use model::Kind;
use model::entities::{catalog_item, user};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use tempfile::TempDir;

use crate::{CredentialHasher, NewItem, Store};

/// Test hashing cost; production uses `CredentialHasher::DEFAULT_ROUNDS`.
pub const TEST_ROUNDS: u32 = 1_000;

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

pub async fn setup_store() -> Store {
    let db = setup_db().await.expect("Failed to set up test database");
    Store::new(db, CredentialHasher::new(TEST_ROUNDS))
}

/// Store over a SQLite file, so the pool hands out several connections and
/// concurrent operations really overlap. Keep the directory alive for the test.
pub async fn setup_file_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create database directory");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("store.db").display()
    );
    let db = Database::connect(&url)
        .await
        .expect("Failed to open file database");
    Migrator::up(&db, None).await.expect("Migrations failed.");

    (Store::new(db, CredentialHasher::new(TEST_ROUNDS)), dir)
}

/// Registers the administrator (id 1) followed by each of `usernames`.
pub async fn seed_users(store: &Store, usernames: &[&str]) -> (user::Model, Vec<user::Model>) {
    let admin = store
        .register("admin", "adminpass")
        .await
        .expect("Failed to register admin");
    let mut users = Vec::new();
    for name in usernames {
        users.push(
            store
                .register(name, "secret1")
                .await
                .expect("Failed to register user"),
        );
    }
    (admin, users)
}

pub async fn seed_item(store: &Store, kind: Kind, title: &str) -> catalog_item::Model {
    store
        .create_item(NewItem {
            kind,
            title: title.to_string(),
            creator: "Someone".to_string(),
            genre: "Drama".to_string(),
            synopsis: None,
            cover: None,
        })
        .await
        .expect("Failed to create item")
}
