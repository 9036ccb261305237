use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Track: index on posted_by (owner lookups, username search join)
        manager
            .create_index(
                Index::create()
                    .name("idx_track_posted_by")
                    .table(Track::Table)
                    .col(Track::PostedBy)
                    .to_owned(),
            )
            .await?;

        // Like: index on track_id
        manager
            .create_index(
                Index::create()
                    .name("idx_like_track")
                    .table(Like::Table)
                    .col(Like::TrackId)
                    .to_owned(),
            )
            .await?;

        // Like: composite unique (user_id, track_id)
        // 并发切换点赞时，落后的插入会因唯一约束失败，而不是产生重复行
        manager
            .create_index(
                Index::create()
                    .name("uniq_like_user_track")
                    .table(Like::Table)
                    .col(Like::UserId)
                    .col(Like::TrackId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_track_posted_by").table(Track::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_like_track").table(Like::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_like_user_track").table(Like::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Track { Table, PostedBy }

#[derive(DeriveIden)]
enum Like { Table, UserId, TrackId }
