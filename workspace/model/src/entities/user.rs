use sea_orm::entity::prelude::*;

/// Avatar assigned to every account until the owner uploads one.
pub const DEFAULT_AVATAR: &str = "default_avatar.png";

/// A registered reviewer.
///
/// The account with id 1 is the administrator (see the store's policy module).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// PHC-formatted salted hash, never the raw password.
    pub password_hash: String,
    pub bio: Option<String>,
    /// Filename under the `avatars/` media directory.
    #[sea_orm(default_value = "default_avatar.png")]
    pub avatar: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user writes reviews of every kind.
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
