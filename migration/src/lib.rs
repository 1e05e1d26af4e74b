pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};
use service::DB_SCHEMA;

mod m20261017_000001_create_schema;
mod m20261017_000002_create_users;
mod m20261017_000003_create_social_accounts;
mod m20261017_000004_create_auth_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261017_000001_create_schema::Migration),
            Box::new(m20261017_000002_create_users::Migration),
            Box::new(m20261017_000003_create_social_accounts::Migration),
            Box::new(m20261017_000004_create_auth_tokens::Migration),
        ]
    }
}

/// Applies every pending migration.
///
/// Connections resolve unqualified names against the service schema, which is
/// where the migrations table lives, so the schema is created up front.
pub async fn run_pending(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(&format!("CREATE SCHEMA IF NOT EXISTS {DB_SCHEMA};"))
        .await?;

    let pending = Migrator::get_pending_migrations(db).await?.len();
    log::info!("Applying {pending} pending database migration(s)");

    Migrator::up(db, None).await
}
