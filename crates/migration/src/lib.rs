//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user;
mod m20240301_000002_create_track;
mod m20240301_000003_create_like;
mod m20240301_000004_add_indexes;
mod m20240301_000005_drop_username_unique;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user::Migration),
            Box::new(m20240301_000002_create_track::Migration),
            Box::new(m20240301_000003_create_like::Migration),
            // Indexes and constraint changes go after the tables
            Box::new(m20240301_000004_add_indexes::Migration),
            Box::new(m20240301_000005_drop_username_unique::Migration),
        ]
    }
}
