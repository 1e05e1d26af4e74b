pub mod prelude;

pub mod auth_tokens;
pub mod social_accounts;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = i32;
