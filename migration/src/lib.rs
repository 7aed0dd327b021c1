pub use sea_orm_migration::prelude::*;

mod m20250210_000001_create_users;
mod m20250211_000001_create_social;
mod m20250212_000001_create_music;
mod m20250213_000001_friendship_pair_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250210_000001_create_users::Migration),
            Box::new(m20250211_000001_create_social::Migration),
            Box::new(m20250212_000001_create_music::Migration),
            Box::new(m20250213_000001_friendship_pair_index::Migration),
        ]
    }
}
