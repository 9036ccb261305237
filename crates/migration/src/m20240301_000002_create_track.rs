//! Create `track` table with a nullable FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Track::Table)
                    .if_not_exists()
                    .col(pk_auto(Track::Id))
                    .col(string_len(Track::Title, 70).not_null())
                    .col(text(Track::Description).not_null().default(""))
                    .col(string_len(Track::Url, 200).not_null())
                    .col(timestamp_with_time_zone(Track::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Track::UpdatedAt).not_null())
                    // posted_by 允许为空：存储层不强制拥有者
                    .col(
                        ColumnDef::new(Track::PostedBy)
                            .uuid()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_track_posted_by")
                            .from(Track::Table, Track::PostedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Track::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Track { Table, Id, Title, Description, Url, CreatedAt, UpdatedAt, PostedBy }

#[derive(DeriveIden)]
enum User { Table, Id }
