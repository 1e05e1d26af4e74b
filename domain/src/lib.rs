//! Account rules and identity flows on top of `entity_api`.
//!
//! Consumers of the `domain` crate do not need to depend on `entity_api` or `entity`
//! directly: the models and the storage id type are re-exported here.
pub use entity_api::{auth_tokens, social_accounts, users, Id};

pub mod auth_token;
pub mod error;
pub mod gateway;
pub mod google_auth;
pub mod user;
