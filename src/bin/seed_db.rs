//! Creates the demo account in a freshly migrated database.

use log::*;
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Seeding database [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migration::run_pending(&db).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    entity_api::seed_database(&db).await;
}
