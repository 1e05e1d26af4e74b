use crate::error::Result as WebResult;
use crate::templates::{render, HomeTemplate};
use axum::response::Html;
use domain::user::AuthSession;

/// GET the landing page.
pub async fn index(auth_session: AuthSession) -> WebResult<Html<String>> {
    render(&HomeTemplate {
        username: auth_session.user.map(|user| user.username),
    })
}
