use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use domain::{auth_token, users};
use log::*;
use serde_json::{json, Value};

const CREDENTIALS_MISSING: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Invalid token.";

/// The user owning the auth token in the `Authorization` header.
pub(crate) struct TokenAuthenticatedUser(pub users::Model);

#[async_trait]
impl FromRequestParts<AppState> for TokenAuthenticatedUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(token_key)
            .ok_or_else(|| unauthorized(CREDENTIALS_MISSING))?;

        match auth_token::authenticate(app_state.db_conn_ref(), key).await {
            Ok(Some(user)) => Ok(TokenAuthenticatedUser(user)),
            Ok(None) => {
                debug!("Rejected request with an unknown auth token");
                Err(unauthorized(INVALID_TOKEN))
            }
            Err(e) => {
                error!("Failed to look up auth token: {e:?}");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error."})),
                ))
            }
        }
    }
}

/// Extracts the key from `Token <key>` or `Bearer <key>`.
fn token_key(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();

    if (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer"))
        && !key.is_empty()
        && !key.contains(' ')
    {
        Some(key)
    } else {
        None
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_key_accepts_both_schemes() {
        assert_eq!(token_key("Token abc123"), Some("abc123"));
        assert_eq!(token_key("Bearer abc123"), Some("abc123"));
        assert_eq!(token_key("token abc123"), Some("abc123"));
    }

    #[test]
    fn token_key_rejects_malformed_headers() {
        assert_eq!(token_key("abc123"), None);
        assert_eq!(token_key("Token "), None);
        assert_eq!(token_key("Basic dXNlcjpwYXNz"), None);
        assert_eq!(token_key("Token abc 123"), None);
    }
}
