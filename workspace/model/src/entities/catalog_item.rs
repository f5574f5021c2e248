use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Cover shown for items that have no artwork of their own.
pub const DEFAULT_COVER: &str = "default_cover.png";

/// The collection a catalog item (and every review of it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Kind {
    #[sea_orm(string_value = "book")]
    Book,
    #[sea_orm(string_value = "movie")]
    Movie,
    #[sea_orm(string_value = "game")]
    Game,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Book => "book",
            Kind::Movie => "movie",
            Kind::Game => "game",
        }
    }

    /// Name of the descriptive attribute stored in `creator` for this kind.
    pub fn creator_field(&self) -> &'static str {
        match self {
            Kind::Book => "author",
            Kind::Movie => "director",
            Kind::Game => "studio",
        }
    }

    /// Sentinel cover filename used when an item has no artwork.
    pub fn default_cover(&self) -> &'static str {
        match self {
            Kind::Book | Kind::Movie | Kind::Game => DEFAULT_COVER,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown item kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for Kind {
    type Err = UnknownKind;

    /// Accepts both the singular and plural route forms ("book", "books").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(Kind::Book),
            "movie" | "movies" => Ok(Kind::Movie),
            "game" | "games" => Ok(Kind::Game),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// A book, movie or game that users can review.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: Kind,
    pub title: String,
    /// Author, director or studio depending on `kind`.
    pub creator: String,
    pub genre: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub synopsis: Option<String>,
    /// Filename under the `covers/` media directory.
    #[sea_orm(default_value = "default_cover.png")]
    pub cover_image: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
