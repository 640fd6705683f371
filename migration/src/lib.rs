pub use sea_orm_migration::prelude::*;

mod m20260715_000001_create_providers;
mod m20260715_000002_create_gpu_models;
mod m20260715_000003_create_prices;
mod m20260801_000001_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260715_000001_create_providers::Migration),
            Box::new(m20260715_000002_create_gpu_models::Migration),
            Box::new(m20260715_000003_create_prices::Migration),
            Box::new(m20260801_000001_seed_reference_data::Migration),
        ]
    }
}
