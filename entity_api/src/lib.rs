use chrono::Utc;
use log::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{auth_tokens, social_accounts, users, Id};

pub mod auth_token;
pub mod error;
pub mod social_account;
pub mod user;

/// Inserts a demo account with a known password for local development.
pub async fn seed_database(db: &DatabaseConnection) {
    let now = Utc::now();

    let demo_user = users::ActiveModel {
        username: Set("demo".to_owned()),
        email: Set("demo@accounts.local".to_owned()),
        first_name: Set("Demo".to_owned()),
        last_name: Set("User".to_owned()),
        password: Set(user::generate_hash("demo-password".to_owned())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    match demo_user.insert(db).await {
        Ok(user) => info!("Seeded user {} (id {})", user.username, user.id),
        Err(e) => error!("Failed to seed demo user: {e}"),
    }
}
