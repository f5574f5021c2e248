use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 20).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len_null(Users::Bio, 500))
                    .col(string(Users::Avatar).default("default_avatar.png"))
                    .to_owned(),
            )
            .await?;

        // Create catalog_items table (books, movies and games)
        manager
            .create_table(
                Table::create()
                    .table(CatalogItems::Table)
                    .if_not_exists()
                    .col(pk_auto(CatalogItems::Id))
                    .col(string_len(CatalogItems::Kind, 10))
                    .col(string(CatalogItems::Title))
                    .col(string(CatalogItems::Creator))
                    .col(string(CatalogItems::Genre))
                    .col(text_null(CatalogItems::Synopsis))
                    .col(string(CatalogItems::CoverImage).default("default_cover.png"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_items_kind")
                    .table(CatalogItems::Table)
                    .col(CatalogItems::Kind)
                    .to_owned(),
            )
            .await?;

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(string_len(Reviews::Kind, 10))
                    .col(text(Reviews::Content))
                    .col(integer(Reviews::UserId))
                    .col(integer(Reviews::ItemId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_item")
                            .from(Reviews::Table, Reviews::ItemId)
                            .to(CatalogItems::Table, CatalogItems::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_kind_item")
                    .table(Reviews::Table)
                    .col(Reviews::Kind)
                    .col(Reviews::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_user")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Bio,
    Avatar,
}

#[derive(DeriveIden)]
enum CatalogItems {
    Table,
    Id,
    Kind,
    Title,
    Creator,
    Genre,
    Synopsis,
    CoverImage,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Kind,
    Content,
    UserId,
    ItemId,
}
