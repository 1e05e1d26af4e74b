use crate::extractors::token_user::TokenAuthenticatedUser;
use axum::Json;
use domain::users;
use serde::Serialize;
use utoipa::ToSchema;

/// Public fields of an account as returned by the JSON API.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<users::Model> for UserSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// GET the account that owns the presented auth token
#[utoipa::path(
    get,
    path = "/api/user/",
    responses(
        (status = 200, description = "Successfully retrieved the token's user", body = UserSummary),
        (status = 401, description = "Missing or unknown auth token"),
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn read(TokenAuthenticatedUser(user): TokenAuthenticatedUser) -> Json<UserSummary> {
    Json(UserSummary::from(user))
}
