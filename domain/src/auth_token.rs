use crate::{error::Error, users};
use sea_orm::DatabaseConnection;

pub use entity_api::auth_token::get_or_create;

/// Resolves the user presenting `key`. Unknown keys yield `Ok(None)`.
pub async fn authenticate(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<users::Model>, Error> {
    if key.is_empty() {
        return Ok(None);
    }
    Ok(entity_api::auth_token::find_user_by_key(db, key).await?)
}
