//! Schema migrations for the content tables.

pub use sea_orm_migration::prelude::*;

mod m20241019_000001_create_content_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241019_000001_create_content_tables::Migration)]
    }
}
