//! Usernames belong to the identity provider and may repeat or change;
//! the local mirror is keyed by id only.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"ALTER TABLE "user" DROP CONSTRAINT IF EXISTS "user_username_key""#)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"ALTER TABLE "user" ADD CONSTRAINT "user_username_key" UNIQUE ("username")"#)
            .await?;
        Ok(())
    }
}
