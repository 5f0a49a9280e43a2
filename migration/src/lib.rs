pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users_table;
mod m20251001_000002_create_services_table;
mod m20251001_000003_create_carts_table;
mod m20251001_000004_create_cart_items_table;
mod m20251001_000005_create_tasks_table;
mod m20251001_000006_create_offers_table;
mod m20251001_000007_create_vouchers_table;
mod m20251001_000008_create_orders_table;
mod m20251001_000009_create_order_providers_table;
mod m20251002_000001_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users_table::Migration),
            Box::new(m20251001_000002_create_services_table::Migration),
            Box::new(m20251001_000003_create_carts_table::Migration),
            Box::new(m20251001_000004_create_cart_items_table::Migration),
            Box::new(m20251001_000005_create_tasks_table::Migration),
            Box::new(m20251001_000006_create_offers_table::Migration),
            Box::new(m20251001_000007_create_vouchers_table::Migration),
            Box::new(m20251001_000008_create_orders_table::Migration),
            Box::new(m20251001_000009_create_order_providers_table::Migration),
            Box::new(m20251002_000001_add_indexes::Migration),
        ]
    }
}
