//! SeaORM entities for the review catalog.
//!
//! Books, movies and games share one `catalog_items` table discriminated by
//! [`catalog_item::Kind`]; reviews of every kind live in `reviews` and carry
//! the same kind tag.

pub mod catalog_item;
pub mod review;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::catalog_item::Entity as CatalogItem;
    pub use super::catalog_item::Kind;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
}
