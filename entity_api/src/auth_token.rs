use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::auth_tokens::{ActiveModel, Column, Entity, Model};
use entity::{users, Id};
use log::*;
use rand::RngCore;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ConnectionTrait, Set};

/// Number of random bytes behind a key; hex encoding doubles it to 32 characters.
const KEY_BYTES: usize = 16;

pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Resolves the user that owns `key`, if any.
pub async fn find_user_by_key(
    db: &impl ConnectionTrait,
    key: &str,
) -> Result<Option<users::Model>, Error> {
    let found = Entity::find_by_id(key.to_owned())
        .find_also_related(users::Entity)
        .one(db)
        .await?;

    Ok(found.and_then(|(_, user)| user))
}

/// Returns the user's token, issuing one first if none exists.
///
/// Atomic under concurrent callers: the insert is `ON CONFLICT (user_id) DO
/// NOTHING`, so exactly one key survives and every caller reads that key back.
pub async fn get_or_create(db: &impl ConnectionTrait, user_id: Id) -> Result<Model, Error> {
    let candidate = ActiveModel {
        key: Set(generate_key()),
        user_id: Set(user_id),
        created_at: Set(Utc::now().into()),
    };

    let inserted = Entity::insert(candidate)
        .on_conflict(OnConflict::column(Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    if inserted > 0 {
        debug!("Issued a new auth token for user {user_id}");
    }

    find_by_user(db, user_id).await?.ok_or_else(|| {
        warn!("Auth token for user {user_id} vanished after upsert");
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    })
}
