pub mod carts;
pub mod offers;
pub mod orders;
pub mod services;
pub mod tasks;
pub mod users;
pub mod vouchers;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Create a SeaORM database connection pool for `database_url`.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
