pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_stations_table;
mod m20250301_000002_click_events;
mod m20250301_000003_period_statistics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_stations_table::Migration),
            Box::new(m20250301_000002_click_events::Migration),
            Box::new(m20250301_000003_period_statistics::Migration),
        ]
    }
}
