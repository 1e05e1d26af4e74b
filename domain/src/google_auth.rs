//! Exchange of a Google access token for a local auth token.
//!
//! The pipeline validates the token with Google, maps the Google identity to a
//! local user (creating one on first sight) and issues that user's auth token.

use crate::error::{AuthenticationErrorKind, Error};
use crate::gateway::google_oauth::{GoogleIdentity, IdentityValidator};
use crate::user::{is_username_char, USERNAME_MAX_LENGTH};
use crate::{auth_tokens, social_accounts::GOOGLE_PROVIDER, users};
use chrono::Utc;
use entity_api::{auth_token, social_account, user};
use log::*;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Length of the random suffix appended to a username that is already taken.
const UNIQUE_SUFFIX_LENGTH: usize = 16;
/// Attempts at creating a new user before giving up on concurrent collisions.
const CREATE_ATTEMPTS: usize = 3;
const FALLBACK_USERNAME: &str = "user";

/// A local auth token together with the user it belongs to.
#[derive(Debug)]
pub struct GoogleLogin {
    pub token: auth_tokens::Model,
    pub user: users::Model,
}

/// Validates `access_token` with `validator` and returns the matching local
/// user and their auth token, creating either when missing.
///
/// Fails with `Authentication(MissingCredential)` for a missing or empty token,
/// `Authentication(Rejected)` when Google declines it and
/// `Authentication(Incomplete)` when no identity comes back. Every other error
/// is an unclassified failure.
pub async fn login(
    db: &DatabaseConnection,
    validator: &dyn IdentityValidator,
    access_token: Option<&str>,
) -> Result<GoogleLogin, Error> {
    let access_token = access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::authentication(AuthenticationErrorKind::MissingCredential))?;

    let identity = validator
        .validate(access_token)
        .await?
        .ok_or_else(|| Error::authentication(AuthenticationErrorKind::Incomplete))?;

    let user = find_or_create_user(db, &identity).await?;
    let token = auth_token::get_or_create(db, user.id).await?;

    info!("Google login for user {} (id {})", user.username, user.id);
    Ok(GoogleLogin { token, user })
}

async fn find_or_create_user(
    db: &DatabaseConnection,
    identity: &GoogleIdentity,
) -> Result<users::Model, Error> {
    if let Some(existing) =
        social_account::find_user_by_uid(db, GOOGLE_PROVIDER, &identity.sub).await?
    {
        return Ok(
            user::update_names(db, existing, &identity.given_name, &identity.family_name).await?,
        );
    }

    let base = base_username(identity);
    for attempt in 1..=CREATE_ATTEMPTS {
        let email = unclaimed_email(db, identity).await?;
        let username = available_username(db, &base).await?;
        let candidate = users::Model {
            id: 0,
            username,
            email,
            first_name: identity.given_name.clone(),
            last_name: identity.family_name.clone(),
            password: String::new(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        match social_account::create_user_with_link(db, candidate, GOOGLE_PROVIDER, &identity.sub)
            .await
        {
            Ok(created) => return Ok(created),
            Err(e) if e.is_unique_violation() => {
                // The identity was linked concurrently, or the username or email got taken.
                if let Some(linked) =
                    social_account::find_user_by_uid(db, GOOGLE_PROVIDER, &identity.sub).await?
                {
                    return Ok(linked);
                }
                warn!("Collision creating Google user (attempt {attempt}): {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::internal(format!(
        "Could not create a user for Google identity {}",
        identity.sub
    )))
}

/// The Google email, or a blank one when another account already holds it.
/// Accounts are never linked to an identity by email alone.
async fn unclaimed_email(
    db: &DatabaseConnection,
    identity: &GoogleIdentity,
) -> Result<String, Error> {
    if user::email_exists(db, &identity.email).await? {
        info!(
            "Email of Google identity {} belongs to another account; creating the user without it",
            identity.sub
        );
        Ok(String::new())
    } else {
        Ok(identity.email.clone())
    }
}

/// Username derived from the local part of the email address.
fn base_username(identity: &GoogleIdentity) -> String {
    let local_part = identity.email.split('@').next().unwrap_or_default();
    let cleaned = clean_username(local_part);
    if cleaned.is_empty() {
        FALLBACK_USERNAME.to_string()
    } else {
        cleaned
    }
}

fn clean_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| is_username_char(*c))
        .take(USERNAME_MAX_LENGTH)
        .collect()
}

/// `base` itself when free, otherwise `base` with a random hex suffix.
async fn available_username(db: &DatabaseConnection, base: &str) -> Result<String, Error> {
    let mut candidate = base.to_string();
    while user::username_exists(db, &candidate).await? {
        candidate = with_random_suffix(base);
    }
    Ok(candidate)
}

fn with_random_suffix(base: &str) -> String {
    let prefix: String = base
        .chars()
        .take(USERNAME_MAX_LENGTH - UNIQUE_SUFFIX_LENGTH)
        .collect();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..UNIQUE_SUFFIX_LENGTH])
}
