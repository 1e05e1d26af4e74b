use crate::error::{Error as WebError, Result as WebResult};
use crate::templates::{render, SignupTemplate};
use crate::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use domain::user as UserApi;
use domain::user::{AuthSession, SignupErrors, SignupForm, SignupResult};
use log::*;

/// GET an empty sign-up form.
pub async fn new() -> WebResult<Html<String>> {
    render(&SignupTemplate {
        username: String::new(),
        errors: SignupErrors::default(),
    })
}

/// Creates an account from the submitted form and logs it in.
///
/// Invalid submissions re-render the form with the submitted username and one
/// message list per field.
pub async fn create(
    State(app_state): State<AppState>,
    mut auth_session: AuthSession,
    Form(form): Form<SignupForm>,
) -> WebResult<Response> {
    match UserApi::signup(app_state.db_conn_ref(), &form).await? {
        SignupResult::Created(user) => {
            auth_session.login(&user).await.map_err(|e| {
                warn!("Session login after sign-up failed: {e:?}");
                WebError::session(e)
            })?;
            Ok(Redirect::to("/").into_response())
        }
        SignupResult::Invalid(errors) => Ok(render(&SignupTemplate {
            username: form.username,
            errors,
        })?
        .into_response()),
    }
}
