use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Memes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Memes::ImageRef)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Captions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Captions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Captions::Text).string().not_null())
                    // JSON array of the meme ids this caption is correct for.
                    .col(ColumnDef::new(Captions::MemeIds).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Captions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Memes {
    Table,
    Id,
    ImageRef,
}

#[derive(DeriveIden)]
enum Captions {
    Table,
    Id,
    Text,
    MemeIds,
}
