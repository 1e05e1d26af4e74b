use crate::error::{Error as WebError, Result as WebResult};
use crate::templates::{render, LoginTemplate};
use axum::{
    extract::Query,
    http::HeaderValue,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use domain::user::{AuthSession, Credentials};
use log::*;
use serde::Deserialize;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    next: Option<String>,
}

/// GET the login form. `next` is carried through to the POST.
pub async fn new(Query(params): Query<NextParams>) -> WebResult<Html<String>> {
    render(&LoginTemplate {
        username: String::new(),
        next: params.next.unwrap_or_default(),
        error: None,
    })
}

/// Logs the user into a new session and redirects to `next`, or `/` when
/// `next` is absent or points off-site.
pub async fn create(
    mut auth_session: AuthSession,
    Form(creds): Form<Credentials>,
) -> WebResult<Response> {
    let user = match auth_session.authenticate(creds.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Authentication failed for username {:?}", creds.username);
            return Ok(render(&LoginTemplate {
                username: creds.username,
                next: creds.next.unwrap_or_default(),
                error: Some(INVALID_LOGIN.to_string()),
            })?
            .into_response());
        }
        Err(auth_error) => {
            error!("Authentication failed with error: {auth_error:?}");
            return Err(WebError::session(auth_error));
        }
    };

    if let Err(login_error) = auth_session.login(&user).await {
        warn!("Session login failed: {login_error:?}");
        return Err(WebError::session(login_error));
    }

    Ok(Redirect::to(local_redirect_target(creds.next.as_deref())).into_response())
}

// Only same-origin absolute paths qualify; `//host` and `/\host` are protocol-relative.
// The target must also be a valid Location header value.
fn local_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && HeaderValue::from_str(path).is_ok() =>
        {
            path
        }
        _ => "/",
    }
}
