use sea_orm_migration::prelude::*;

mod m20260201_000001_create_ward_tables;
mod m20260201_000002_create_menu_tables;
mod m20260201_000003_create_bed_menus;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_create_ward_tables::Migration),
            Box::new(m20260201_000002_create_menu_tables::Migration),
            Box::new(m20260201_000003_create_bed_menus::Migration),
        ]
    }
}
