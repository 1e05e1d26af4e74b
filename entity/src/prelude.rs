pub use super::auth_tokens::Entity as AuthTokens;
pub use super::social_accounts::Entity as SocialAccounts;
pub use super::users::Entity as Users;
