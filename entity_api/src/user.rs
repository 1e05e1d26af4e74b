use super::error::{EntityApiErrorKind, Error};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model, UNUSABLE_PASSWORD_PREFIX};
use entity::Id;
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, Set};
use serde::Deserialize;
use std::sync::Arc;

/// Inserts a user, storing a hash of `user_model.password`.
pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    let password_hash = generate_hash(user_model.password.clone());
    insert(db, user_model, password_hash).await
}

/// Inserts a user that cannot log in with a password, e.g. one created by a social login.
/// `user_model.password` is ignored.
pub async fn create_with_unusable_password(
    db: &impl ConnectionTrait,
    user_model: Model,
) -> Result<Model, Error> {
    insert(db, user_model, unusable_password()).await
}

async fn insert(
    db: &impl ConnectionTrait,
    user_model: Model,
    password_hash: String,
) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {}", user_model.username);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        username: Set(user_model.username),
        email: Set(user_model.email),
        first_name: Set(user_model.first_name),
        last_name: Set(user_model.last_name),
        password: Set(password_hash),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_username(
    db: &impl ConnectionTrait,
    username: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn username_exists(db: &impl ConnectionTrait, username: &str) -> Result<bool, Error> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username))
        .count(db)
        .await?
        > 0)
}

/// Whether another account already holds `email`. Blank emails are never taken.
pub async fn email_exists(db: &impl ConnectionTrait, email: &str) -> Result<bool, Error> {
    if email.is_empty() {
        return Ok(false);
    }

    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .count(db)
        .await?
        > 0)
}

/// Overwrites the user's first and last name when they differ from the stored values.
pub async fn update_names(
    db: &impl ConnectionTrait,
    user: Model,
    first_name: &str,
    last_name: &str,
) -> Result<Model, Error> {
    if user.first_name == first_name && user.last_name == last_name {
        return Ok(user);
    }

    debug!("Updating names of user {}", user.id);

    let mut active_model: ActiveModel = user.into();
    active_model.first_name = Set(first_name.to_owned());
    active_model.last_name = Set(last_name.to_owned());
    active_model.updated_at = Set(Utc::now().into());

    Ok(active_model.update(db).await?)
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

/// A password marker that can never match any password.
pub fn unusable_password() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();
    format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}")
}

fn authenticate_user(creds: &Credentials, user: Model) -> Option<Model> {
    if !user.has_usable_password() {
        return None;
    }

    match password_auth::verify_password(&creds.password, &user.password) {
        Ok(_) => Some(user),
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
}

impl Backend {
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self { db: Arc::clone(db) }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Model;
    type Credentials = Credentials;
    type Error = Error;

    // Unknown usernames and wrong passwords both yield Ok(None).
    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let user = find_by_username(self.db.as_ref(), &creds.username).await?;
        Ok(user.and_then(|user| authenticate_user(&creds, user)))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(Entity::find_by_id(*user_id).one(self.db.as_ref()).await?)
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;
