use model::Kind;
use model::entities::{catalog_item, review};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, Iterable, Order, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StoreError};
use crate::{ItemId, Store, UserId, policy};

/// Fields accepted when adding an item to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub kind: Kind,
    pub title: String,
    /// Author, director or studio depending on `kind`.
    pub creator: String,
    pub genre: String,
    pub synopsis: Option<String>,
    /// Cover filename; the kind's sentinel is used when absent.
    pub cover: Option<String>,
}

/// Ordering applied when listing a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Shuffled on every call, used by browse pages.
    #[default]
    Random,
    /// Most recently created first.
    Newest,
}

fn required(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid_field(field, "is required"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn of_kind(kind: Kind) -> Select<catalog_item::Entity> {
    catalog_item::Entity::find().filter(catalog_item::Column::Kind.eq(kind))
}

impl Store {
    #[instrument(skip(self, new_item), fields(kind = %new_item.kind, title = %new_item.title))]
    pub async fn create_item(&self, new_item: NewItem) -> Result<catalog_item::Model> {
        let NewItem {
            kind,
            title,
            creator,
            genre,
            synopsis,
            cover,
        } = new_item;

        required(&title, "title")?;
        required(&creator, kind.creator_field())?;
        required(&genre, "genre")?;

        let cover_image = non_blank(cover).unwrap_or_else(|| kind.default_cover().to_string());

        let txn = self.db.begin().await?;
        let created = catalog_item::ActiveModel {
            kind: Set(kind),
            title: Set(title),
            creator: Set(creator),
            genre: Set(genre),
            synopsis: Set(non_blank(synopsis)),
            cover_image: Set(cover_image),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!("Created {} {} '{}'", kind, created.id, created.title);
        Ok(created)
    }

    /// Looks up an item inside one kind's collection; an id that belongs to a
    /// different kind is reported as missing.
    #[instrument(skip(self))]
    pub async fn get_item(&self, kind: Kind, item_id: ItemId) -> Result<catalog_item::Model> {
        of_kind(kind)
            .filter(catalog_item::Column::Id.eq(item_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.as_str(), item_id))
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        kind: Kind,
        order: ListOrder,
        limit: Option<u64>,
    ) -> Result<Vec<catalog_item::Model>> {
        let mut query = of_kind(kind);
        query = match order {
            ListOrder::Random => query.order_by(Expr::cust("RANDOM()"), Order::Asc),
            ListOrder::Newest => query.order_by_desc(catalog_item::Column::Id),
        };
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let items = query.all(&self.db).await?;
        debug!("Listed {} {} items", items.len(), kind);
        Ok(items)
    }

    /// Up to `per_kind` random items from every collection, in `Kind` order.
    #[instrument(skip(self))]
    pub async fn featured(&self, per_kind: u64) -> Result<Vec<(Kind, Vec<catalog_item::Model>)>> {
        let mut featured = Vec::new();
        for kind in Kind::iter() {
            let items = self
                .list_items(kind, ListOrder::Random, Some(per_kind))
                .await?;
            featured.push((kind, items));
        }
        Ok(featured)
    }

    /// Points an item at a different cover file.
    #[instrument(skip(self))]
    pub async fn set_cover(
        &self,
        kind: Kind,
        item_id: ItemId,
        filename: &str,
    ) -> Result<catalog_item::Model> {
        required(filename, "cover_image")?;

        let txn = self.db.begin().await?;
        let existing = of_kind(kind)
            .filter(catalog_item::Column::Id.eq(item_id))
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.as_str(), item_id))?;

        let mut active = existing.into_active_model();
        active.cover_image = Set(filename.to_string());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        debug!("Set cover of {} {} to '{}'", kind, item_id, filename);
        Ok(updated)
    }

    /// Deletes an item together with all of its reviews.
    ///
    /// Existence is checked before authorization, so a missing item is always
    /// `NotFound` whoever asks. Returns the number of reviews removed.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, kind: Kind, item_id: ItemId, caller: UserId) -> Result<u64> {
        let txn = self.db.begin().await?;

        let item = of_kind(kind)
            .filter(catalog_item::Column::Id.eq(item_id))
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.as_str(), item_id))?;

        if !policy::can_delete_item(caller) {
            warn!("User {} may not delete {} {}", caller, kind, item_id);
            return Err(StoreError::Forbidden(format!(
                "only the administrator can delete {} items",
                kind
            )));
        }

        let removed_reviews = review::Entity::delete_many()
            .filter(review::Column::ItemId.eq(item.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let deleted = catalog_item::Entity::delete_by_id(item.id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            return Err(StoreError::not_found(kind.as_str(), item_id));
        }

        txn.commit().await?;

        info!(
            "Deleted {} {} '{}' and {} reviews",
            kind, item.id, item.title, removed_reviews
        );
        Ok(removed_reviews)
    }
}
