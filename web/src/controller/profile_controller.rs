use crate::error::Result as WebResult;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::templates::{render, ProfileTemplate};
use axum::response::Html;
use log::*;

/// GET the profile page of the logged-in user. Mounted behind `require_login`.
pub async fn read(AuthenticatedUser(user): AuthenticatedUser) -> WebResult<Html<String>> {
    debug!("Rendering profile of user {}", user.id);

    render(&ProfileTemplate {
        username: user.username,
        email: user.email,
    })
}
