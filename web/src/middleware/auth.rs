use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use domain::user::AuthSession;

pub(crate) const LOGIN_PATH: &str = "/login/";

/// Page middleware that sends visitors without a session to the login form.
///
/// The originally requested path travels along as `next` so that a successful
/// login lands back on it.
pub async fn require_login(auth_session: AuthSession, request: Request, next: Next) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        None => {
            let target = request
                .uri()
                .path_and_query()
                .map(|path| path.as_str())
                .unwrap_or("/");
            Redirect::to(&login_url(target)).into_response()
        }
    }
}

/// The login form URL with `target` percent-encoded as `next`. Slashes stay readable.
pub(crate) fn login_url(target: &str) -> String {
    let next = urlencoding::encode(target).replace("%2F", "/");
    format!("{LOGIN_PATH}?next={next}")
}


#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware::from_fn,
        response::Response,
        routing::get,
        Router,
    };
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use domain::user::Backend;
    use service::config::Config;
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn app() -> Router {
        let config = Config::default();
        let db = Arc::new(
            sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection(),
        );
        let app_state = crate::AppState::new(config, &db);

        let session_store = MemoryStore::default();
        let session_layer = SessionManagerLayer::new(session_store)
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)));

        let backend = Backend::new(&db);
        let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

        Router::new()
            .route("/account/settings", get(test_handler))
            .route_layer(from_fn(require_login))
            .layer(auth_layer)
            .with_state(app_state)
    }

    #[tokio::test]
    async fn redirects_to_login_with_the_requested_path() {
        let request = Request::builder()
            .uri("/account/settings?tab=email")
            .body(Body::empty())
            .unwrap();
        let response: Response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login/?next=/account/settings%3Ftab%3Demail"
        );
    }

    #[tokio::test]
    async fn redirects_when_the_session_cookie_is_unknown() {
        let request = Request::builder()
            .uri("/account/settings")
            .header("cookie", "id=invalid-session-id")
            .body(Body::empty())
            .unwrap();
        let response: Response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
