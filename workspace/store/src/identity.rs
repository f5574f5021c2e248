use model::entities::user::{self, DEFAULT_AVATAR};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StoreError};
use crate::{Store, UserId};

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 20;
pub const BIO_MAX_LEN: usize = 500;

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(StoreError::invalid_field(
            "username",
            format!(
                "must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }
    Ok(())
}

impl Store {
    /// Creates an account with a freshly salted credential.
    ///
    /// The password is hashed before the transaction begins. Inside it the
    /// username is checked and inserted; a concurrent registration that slips
    /// past the check is caught by the unique index and reported the same way.
    #[instrument(skip(self, raw_password))]
    pub async fn register(&self, username: &str, raw_password: &str) -> Result<user::Model> {
        validate_username(username)?;
        if raw_password.is_empty() {
            return Err(StoreError::invalid_field("password", "must not be empty"));
        }

        let password_hash = self.hasher.hash_blocking(raw_password.to_string()).await?;

        let txn = self.db.begin().await?;

        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&txn)
            .await?;
        if taken.is_some() {
            warn!("Registration rejected, username '{}' is taken", username);
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let created = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            bio: Set(None),
            avatar: Set(DEFAULT_AVATAR.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| StoreError::from_user_insert(e, username))?;

        txn.commit().await?;

        info!("Registered user '{}' with id {}", created.username, created.id);
        Ok(created)
    }

    /// Returns the user when `raw_password` matches the stored credential.
    ///
    /// Unknown usernames, wrong passwords and unreadable hashes all yield
    /// `AuthFailure`. An unknown username still pays for one key derivation,
    /// so response time does not reveal which accounts exist.
    #[instrument(skip(self, raw_password))]
    pub async fn verify_credential(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<user::Model> {
        let Some(found) = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
        else {
            debug!("Login attempt for unknown username '{}'", username);
            // One key derivation, the same cost as checking a real credential
            if let Err(e) = self.hasher.hash_blocking(raw_password.to_string()).await {
                warn!("Decoy hashing failed: {}", e);
            }
            return Err(StoreError::AuthFailure);
        };

        let matched = self
            .hasher
            .verify_blocking(raw_password.to_string(), found.password_hash.clone())
            .await;
        if !matched {
            debug!("Password mismatch for user {}", found.id);
            return Err(StoreError::AuthFailure);
        }

        Ok(found)
    }

    /// Overwrites only the supplied profile fields.
    #[instrument(skip(self, bio))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        bio: Option<String>,
        avatar: Option<String>,
    ) -> Result<user::Model> {
        if let Some(bio) = &bio {
            if bio.chars().count() > BIO_MAX_LEN {
                return Err(StoreError::invalid_field(
                    "bio",
                    format!("must be at most {} characters", BIO_MAX_LEN),
                ));
            }
        }
        if let Some(avatar) = &avatar {
            if avatar.trim().is_empty() {
                return Err(StoreError::invalid_field("avatar", "must not be empty"));
            }
        }

        let txn = self.db.begin().await?;

        let existing = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", user_id))?;

        let mut active = existing.into_active_model();
        if let Some(bio) = bio {
            active.bio = Set(Some(bio));
        }
        if let Some(avatar) = avatar {
            active.avatar = Set(avatar);
        }
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        debug!("Updated profile of user {}", user_id);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: UserId) -> Result<user::Model> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredentialHasher;
    use crate::testing::{setup_db, setup_file_store, setup_store};
    use std::time::Instant;

    #[tokio::test]
    async fn test_register_then_verify() {
        let store = setup_store().await;

        let alice = store.register("alice", "secret1").await.unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(alice.avatar, DEFAULT_AVATAR);
        assert_eq!(alice.bio, None);
        assert_ne!(alice.password_hash, "secret1");

        let verified = store.verify_credential("alice", "secret1").await.unwrap();
        assert_eq!(verified.id, alice.id);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails_once() {
        let store = setup_store().await;

        store.register("alice", "secret1").await.unwrap();
        let err = store.register("alice", "other-pass").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(name) if name == "alice"));

        // The original credential is untouched
        assert!(store.verify_credential("alice", "secret1").await.is_ok());
        assert!(store.verify_credential("alice", "other-pass").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_have_one_winner() {
        let (store, _dir) = setup_file_store().await;

        for round in 0..10 {
            let username = format!("racer{}", round);
            let first = tokio::spawn({
                let store = store.clone();
                let username = username.clone();
                async move { store.register(&username, "secret1").await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                let username = username.clone();
                async move { store.register(&username, "secret2").await }
            });

            let outcomes = [first.await.unwrap(), second.await.unwrap()];
            let wins = outcomes.iter().filter(|r| r.is_ok()).count();
            let duplicates = outcomes
                .iter()
                .filter(|r| matches!(r, Err(StoreError::DuplicateUsername(name)) if *name == username))
                .count();
            assert_eq!(wins, 1, "round {}: {:?}", round, outcomes);
            assert_eq!(duplicates, 1, "round {}: {:?}", round, outcomes);
        }
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_key_derivation() {
        let db = setup_db().await.unwrap();
        let store = Store::new(db, CredentialHasher::new(50_000));
        store.register("alice", "secret1").await.unwrap();

        let started = Instant::now();
        let err = store.verify_credential("alice", "wrong-pass").await.unwrap_err();
        let wrong_password = started.elapsed();
        assert!(matches!(err, StoreError::AuthFailure));

        let started = Instant::now();
        let err = store.verify_credential("nobody", "wrong-pass").await.unwrap_err();
        let unknown_user = started.elapsed();
        assert!(matches!(err, StoreError::AuthFailure));

        assert!(
            unknown_user * 3 >= wrong_password,
            "unknown user took {:?}, wrong password {:?}",
            unknown_user,
            wrong_password
        );
    }

    #[tokio::test]
    async fn test_wrong_password_of_any_length_fails() {
        let store = setup_store().await;
        store.register("alice", "secret1").await.unwrap();

        for attempt in ["", "s", "secret", "secret12", &"x".repeat(500)] {
            let err = store.verify_credential("alice", attempt).await.unwrap_err();
            assert!(matches!(err, StoreError::AuthFailure), "attempt {:?}", attempt);
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_auth_failure() {
        let store = setup_store().await;
        let err = store.verify_credential("nobody", "secret1").await.unwrap_err();
        assert!(matches!(err, StoreError::AuthFailure));
    }

    #[tokio::test]
    async fn test_username_length_rules() {
        let store = setup_store().await;

        for bad in ["abc", "", &"a".repeat(21)] {
            let err = store.register(bad, "secret1").await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidField { field: "username", .. }));
        }

        assert!(store.register("abcd", "secret1").await.is_ok());
        assert!(store.register(&"b".repeat(20), "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_overwrites_only_supplied_fields() {
        let store = setup_store().await;
        let alice = store.register("alice", "secret1").await.unwrap();

        let updated = store
            .update_profile(alice.id, Some("Reads a lot".to_string()), None)
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Reads a lot"));
        assert_eq!(updated.avatar, DEFAULT_AVATAR);

        let updated = store
            .update_profile(alice.id, None, Some("alice.png".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Reads a lot"));
        assert_eq!(updated.avatar, "alice.png");

        let reloaded = store.get_user(alice.id).await.unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_invalid_input() {
        let store = setup_store().await;
        let alice = store.register("alice", "secret1").await.unwrap();

        let err = store
            .update_profile(alice.id, Some("x".repeat(501)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "bio", .. }));

        let err = store
            .update_profile(42, Some("hello".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "user", id: 42 }));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let store = setup_store().await;
        let err = store.get_user(7).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "user", id: 7 }));
    }
}
