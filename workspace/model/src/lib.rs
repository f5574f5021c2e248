pub mod entities;

pub use entities::catalog_item::Kind;
