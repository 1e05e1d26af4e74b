use crate::controller::api::user_controller::UserSummary;
use crate::error::GoogleAuthError;
use crate::extractors::access_token::AccessToken;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use domain::gateway::google_oauth::IdentityValidator;
use domain::google_auth::{self, GoogleLogin};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AccessTokenParams {
    /// Google OAuth2 access token obtained by the frontend.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoogleAuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Exchanges a Google access token for this service's auth token.
///
/// Creates the account on the first login of a Google identity. Send the
/// returned token as `Authorization: Token <token>` on later API calls.
#[utoipa::path(
    post,
    path = "/api/google-auth/",
    request_body(content = AccessTokenParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Authenticated; returns the auth token and its user", body = GoogleAuthResponse),
        (status = 400, description = "Missing token, token rejected by Google, or no identity returned"),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Authentication failed for another reason")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Extension(validator): Extension<Arc<dyn IdentityValidator>>,
    AccessToken(access_token): AccessToken,
) -> Result<Json<GoogleAuthResponse>, GoogleAuthError> {
    let GoogleLogin { token, user } = google_auth::login(
        app_state.db_conn_ref(),
        validator.as_ref(),
        access_token.as_deref(),
    )
    .await?;

    Ok(Json(GoogleAuthResponse {
        token: token.key,
        user: UserSummary::from(user),
    }))
}
