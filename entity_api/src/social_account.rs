use super::error::Error;
use super::user;
use chrono::Utc;
use entity::social_accounts::{ActiveModel, Column, Entity};
use entity::users;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set, TransactionTrait};

/// Finds the local user linked to `uid` at `provider`.
pub async fn find_user_by_uid(
    db: &impl ConnectionTrait,
    provider: &str,
    uid: &str,
) -> Result<Option<users::Model>, Error> {
    let found = Entity::find()
        .filter(Column::Provider.eq(provider))
        .filter(Column::Uid.eq(uid))
        .find_also_related(users::Entity)
        .one(db)
        .await?;

    Ok(found.and_then(|(_, user)| user))
}

/// Creates a password-less user and links it to `uid` at `provider` in one transaction.
///
/// Fails with `UniqueViolation` when a concurrent request linked the same
/// identity first; nothing is persisted in that case.
pub async fn create_user_with_link(
    db: &impl TransactionTrait,
    user_model: users::Model,
    provider: &str,
    uid: &str,
) -> Result<users::Model, Error> {
    let txn = db.begin().await?;

    let user = user::create_with_unusable_password(&txn, user_model).await?;

    let link = ActiveModel {
        user_id: Set(user.id),
        provider: Set(provider.to_owned()),
        uid: Set(uid.to_owned()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    link.insert(&txn).await?;

    txn.commit().await?;

    info!("Linked {provider} identity to new user {}", user.id);
    Ok(user)
}
