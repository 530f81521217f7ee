use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use super::connection::{establish_connection, get_database_url};
use super::migrations::Migrator;

/// Create an in-memory SQLite database with the schema applied
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = establish_connection(&get_database_url(Some(":memory:"))).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
