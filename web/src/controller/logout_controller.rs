use crate::middleware::auth::LOGIN_PATH;
use axum::response::Redirect;
use domain::user::AuthSession;
use log::*;

/// Ends the current session, if any, and sends the browser to the login page.
///
/// The redirect happens even when the session store fails; the failure is only logged.
pub async fn delete(mut auth_session: AuthSession) -> Redirect {
    trace!("LogoutController::delete()");

    match auth_session.logout().await {
        Ok(Some(user)) => info!("User {} logged out", user.id),
        Ok(None) => debug!("Logout requested without an active session"),
        Err(e) => error!("Failed to end session on logout: {e:?}"),
    }

    Redirect::to(LOGIN_PATH)
}
