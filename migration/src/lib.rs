pub use sea_orm_migration::prelude::*;

mod m20250812_101500_create_table_file;
mod m20250812_101501_create_table_song;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250812_101500_create_table_file::Migration),
            Box::new(m20250812_101501_create_table_song::Migration),
        ]
    }
}
