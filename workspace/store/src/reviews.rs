use model::Kind;
use model::entities::{catalog_item, review, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StoreError};
use crate::{ItemId, ReviewId, Store, UserId, policy};

impl Store {
    /// Attaches a review to an item of `kind`.
    ///
    /// The item must exist in that kind's collection; the review inherits the
    /// kind and keeps it for life.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn create_review(
        &self,
        kind: Kind,
        item_id: ItemId,
        author_id: UserId,
        content: &str,
    ) -> Result<review::Model> {
        if content.trim().is_empty() {
            return Err(StoreError::InvalidContent);
        }

        let txn = self.db.begin().await?;

        catalog_item::Entity::find_by_id(item_id)
            .filter(catalog_item::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.as_str(), item_id))?;

        user::Entity::find_by_id(author_id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", author_id))?;

        let created = review::ActiveModel {
            kind: Set(kind),
            content: Set(content.to_string()),
            user_id: Set(author_id),
            item_id: Set(item_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "User {} reviewed {} {} (review {})",
            author_id, kind, item_id, created.id
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, kind: Kind, review_id: ReviewId) -> Result<review::Model> {
        review::Entity::find_by_id(review_id)
            .filter(review::Column::Kind.eq(kind))
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("review", review_id))
    }

    /// Reviews of one item, oldest first. An unknown item has no reviews.
    #[instrument(skip(self))]
    pub async fn list_reviews_for_item(
        &self,
        kind: Kind,
        item_id: ItemId,
    ) -> Result<Vec<review::Model>> {
        let reviews = review::Entity::find()
            .filter(review::Column::Kind.eq(kind))
            .filter(review::Column::ItemId.eq(item_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Found {} reviews for {} {}", reviews.len(), kind, item_id);
        Ok(reviews)
    }

    /// Every review a user has written across all kinds, newest first.
    #[instrument(skip(self))]
    pub async fn list_reviews_for_user(&self, user_id: UserId) -> Result<Vec<review::Model>> {
        let reviews = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Found {} reviews by user {}", reviews.len(), user_id);
        Ok(reviews)
    }

    /// Removes a review on behalf of its author or the administrator.
    ///
    /// A review that vanished between lookup and delete is `NotFound`, so of
    /// two racing deletes exactly one succeeds.
    #[instrument(skip(self))]
    pub async fn delete_review(
        &self,
        kind: Kind,
        review_id: ReviewId,
        caller: UserId,
    ) -> Result<()> {
        let txn = self.db.begin().await?;

        let existing = review::Entity::find_by_id(review_id)
            .filter(review::Column::Kind.eq(kind))
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("review", review_id))?;

        if !policy::can_delete_review(&existing, caller) {
            warn!(
                "User {} may not delete review {} by user {}",
                caller, review_id, existing.user_id
            );
            return Err(StoreError::Forbidden(
                "only the author or the administrator can delete this review".to_string(),
            ));
        }

        let deleted = review::Entity::delete_by_id(review_id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            return Err(StoreError::not_found("review", review_id));
        }

        txn.commit().await?;

        info!("User {} deleted review {}", caller, review_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_item, seed_users, setup_file_store, setup_store};

    #[tokio::test]
    async fn test_create_review_inherits_kind() {
        let store = setup_store().await;
        let (_, users) = seed_users(&store, &["alice"]).await;
        let game = seed_item(&store, Kind::Game, "Portal").await;

        let review = store
            .create_review(Kind::Game, game.id, users[0].id, "The cake is a lie")
            .await
            .unwrap();
        assert_eq!(review.kind, Kind::Game);
        assert_eq!(review.item_id, game.id);
        assert_eq!(review.user_id, users[0].id);
    }

    #[tokio::test]
    async fn test_create_review_rejects_empty_content() {
        let store = setup_store().await;
        let (admin, _) = seed_users(&store, &[]).await;
        let book = seed_item(&store, Kind::Book, "Dune").await;

        for content in ["", "   \n\t"] {
            let err = store
                .create_review(Kind::Book, book.id, admin.id, content)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidContent));
        }
        assert!(
            store
                .list_reviews_for_item(Kind::Book, book.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_create_review_checks_item_kind_and_author() {
        let store = setup_store().await;
        let (admin, _) = seed_users(&store, &[]).await;
        let book = seed_item(&store, Kind::Book, "Dune").await;

        // A book id is not a movie id
        let err = store
            .create_review(Kind::Movie, book.id, admin.id, "Wrong collection")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "movie", .. }));

        let err = store
            .create_review(Kind::Book, book.id, 77, "Ghost author here")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "user", id: 77 }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_have_one_winner() {
        let (store, _dir) = setup_file_store().await;
        let (_, users) = seed_users(&store, &["alice"]).await;
        let alice = users[0].id;
        let movie = seed_item(&store, Kind::Movie, "Alien").await;

        for round in 0..10 {
            let review_id = store
                .create_review(Kind::Movie, movie.id, alice, "In space no one can hear you")
                .await
                .unwrap()
                .id;

            let first = tokio::spawn({
                let store = store.clone();
                async move { store.delete_review(Kind::Movie, review_id, alice).await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                async move { store.delete_review(Kind::Movie, review_id, alice).await }
            });

            let outcomes = [first.await.unwrap(), second.await.unwrap()];
            let wins = outcomes.iter().filter(|r| r.is_ok()).count();
            let missing = outcomes
                .iter()
                .filter(|r| matches!(r, Err(StoreError::NotFound { entity: "review", .. })))
                .count();
            assert_eq!(wins, 1, "round {}: {:?}", round, outcomes);
            assert_eq!(missing, 1, "round {}: {:?}", round, outcomes);
        }

        assert!(
            store
                .list_reviews_for_item(Kind::Movie, movie.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_list_reviews_for_item() {
        let store = setup_store().await;
        let (admin, users) = seed_users(&store, &["alice"]).await;
        let book = seed_item(&store, Kind::Book, "Dune").await;
        let other = seed_item(&store, Kind::Book, "Emma").await;

        let first = store
            .create_review(Kind::Book, book.id, users[0].id, "A desert classic")
            .await
            .unwrap();
        let second = store
            .create_review(Kind::Book, book.id, admin.id, "Long but rewarding")
            .await
            .unwrap();
        store
            .create_review(Kind::Book, other.id, admin.id, "Matchmaking gone wrong")
            .await
            .unwrap();

        let reviews = store
            .list_reviews_for_item(Kind::Book, book.id)
            .await
            .unwrap();
        assert_eq!(reviews, vec![first, second]);

        assert!(
            store
                .list_reviews_for_item(Kind::Book, 999)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            store
                .list_reviews_for_item(Kind::Game, book.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_list_reviews_for_user_spans_kinds_newest_first() {
        let store = setup_store().await;
        let (admin, users) = seed_users(&store, &["alice"]).await;
        let alice = &users[0];

        let book = seed_item(&store, Kind::Book, "Dune").await;
        let movie = seed_item(&store, Kind::Movie, "Alien").await;
        let game = seed_item(&store, Kind::Game, "Portal").await;

        let on_book = store
            .create_review(Kind::Book, book.id, alice.id, "A desert classic")
            .await
            .unwrap();
        store
            .create_review(Kind::Book, book.id, admin.id, "Admin has opinions")
            .await
            .unwrap();
        let on_movie = store
            .create_review(Kind::Movie, movie.id, alice.id, "Tense from start to end")
            .await
            .unwrap();
        let on_game = store
            .create_review(Kind::Game, game.id, alice.id, "Thinking with portals")
            .await
            .unwrap();

        let reviews = store.list_reviews_for_user(alice.id).await.unwrap();
        assert_eq!(reviews, vec![on_game, on_movie, on_book]);
    }

    #[tokio::test]
    async fn test_delete_review_policy() {
        let store = setup_store().await;
        let (admin, users) = seed_users(&store, &["alice", "bobby"]).await;
        let (alice, bobby) = (&users[0], &users[1]);
        let movie = seed_item(&store, Kind::Movie, "Alien").await;

        let review = store
            .create_review(Kind::Movie, movie.id, alice.id, "In space no one can hear")
            .await
            .unwrap();

        let err = store
            .delete_review(Kind::Movie, review.id, bobby.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        assert_eq!(
            store.get_review(Kind::Movie, review.id).await.unwrap(),
            review
        );

        store
            .delete_review(Kind::Movie, review.id, alice.id)
            .await
            .unwrap();
        let err = store
            .get_review(Kind::Movie, review.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "review", .. }));

        let by_bobby = store
            .create_review(Kind::Movie, movie.id, bobby.id, "Better than the sequel")
            .await
            .unwrap();
        store
            .delete_review(Kind::Movie, by_bobby.id, admin.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_review_twice_is_not_found() {
        let store = setup_store().await;
        let (admin, _) = seed_users(&store, &[]).await;
        let game = seed_item(&store, Kind::Game, "Portal").await;
        let review = store
            .create_review(Kind::Game, game.id, admin.id, "Thinking with portals")
            .await
            .unwrap();

        store
            .delete_review(Kind::Game, review.id, admin.id)
            .await
            .unwrap();
        let err = store
            .delete_review(Kind::Game, review.id, admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_review_under_wrong_kind_is_not_found() {
        let store = setup_store().await;
        let (admin, _) = seed_users(&store, &[]).await;
        let game = seed_item(&store, Kind::Game, "Portal").await;
        let review = store
            .create_review(Kind::Game, game.id, admin.id, "Thinking with portals")
            .await
            .unwrap();

        let err = store
            .delete_review(Kind::Book, review.id, admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.get_review(Kind::Game, review.id).await.is_ok());
    }
}
