use crate::controller::api::google_auth_controller::AccessTokenParams;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use log::*;
use std::convert::Infallible;

/// The `access_token` field of a JSON or urlencoded form body.
///
/// Never rejects: an absent field, an unknown content type or a body that
/// fails to parse all yield `AccessToken(None)`.
#[derive(Debug)]
pub(crate) struct AccessToken(pub Option<String>);

#[async_trait]
impl<S> FromRequest<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = if content_type.starts_with("application/json") {
            Json::<AccessTokenParams>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<AccessTokenParams>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else {
            Err(format!("unsupported content type {content_type:?}"))
        };

        match body {
            Ok(body) => Ok(AccessToken(body.access_token)),
            Err(reason) => {
                debug!("Ignoring unreadable Google auth body: {reason}");
                Ok(AccessToken(None))
            }
        }
    }
}
