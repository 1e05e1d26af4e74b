//! Google access-token validation.
//!
//! The frontend completes Google's consent screen itself and hands the backend
//! an access token. This client checks that token against Google and returns
//! the OpenID claims of its owner.

use crate::error::{AuthenticationErrorKind, DomainErrorKind, Error, ExternalErrorKind};
use async_trait::async_trait;
use log::*;
use reqwest::StatusCode;
use serde::Deserialize;
use service::config::Config;

/// Identity claims of a validated Google account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Google's stable account identifier (`sub`).
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub given_name: String,
    pub family_name: String,
}

/// Verifies a bearer token with an identity provider.
#[async_trait]
pub trait IdentityValidator: Send + Sync {
    /// Returns `Ok(None)` when the provider accepted the token but reported no
    /// identity. A declined token is an `Authentication(Rejected)` error.
    async fn validate(&self, access_token: &str) -> Result<Option<GoogleIdentity>, Error>;
}

/// Configuration for Google OAuth URLs
#[derive(Debug, Clone)]
pub struct GoogleOAuthUrls {
    pub tokeninfo_url: String,
    pub userinfo_url: String,
}

/// Body of Google's token-info response; only the audience fields are used.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    azp: Option<String>,
}

/// Body of Google's OpenID userinfo response.
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct GoogleOAuthClient {
    client: reqwest::Client,
    client_id: Option<String>,
    urls: GoogleOAuthUrls,
}

impl GoogleOAuthClient {
    pub fn new(client_id: Option<String>, urls: GoogleOAuthUrls) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            client_id,
            urls,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(
            config.google_client_id(),
            GoogleOAuthUrls {
                tokeninfo_url: config.google_tokeninfo_url().to_string(),
                userinfo_url: config.google_userinfo_url().to_string(),
            },
        )
    }

    /// Checks that the token was issued to our OAuth client.
    async fn verify_audience(&self, access_token: &str, client_id: &str) -> Result<(), Error> {
        let response = self
            .client
            .get(&self.urls.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google token info: {:?}", e);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection_or_failure(status, response.text().await.unwrap_or_default()));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token info: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Invalid response from Google token info".to_string(),
                )),
            }
        })?;

        let issued_to_us = [info.aud.as_deref(), info.azp.as_deref()]
            .into_iter()
            .flatten()
            .any(|audience| audience == client_id);

        if issued_to_us {
            Ok(())
        } else {
            warn!("Google token was issued to another client: {:?}", info.aud);
            Err(Error::authentication(AuthenticationErrorKind::Rejected(
                "Token error: token was issued for a different client".to_string(),
            )))
        }
    }

    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let response = self
            .client
            .get(&self.urls.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Google user info: {:?}", e);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection_or_failure(status, response.text().await.unwrap_or_default()));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Google user info: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Invalid response from Google".to_string(),
                )),
            }
        })
    }
}

#[async_trait]
impl IdentityValidator for GoogleOAuthClient {
    async fn validate(&self, access_token: &str) -> Result<Option<GoogleIdentity>, Error> {
        if let Some(client_id) = self.client_id.as_deref() {
            self.verify_audience(access_token, client_id).await?;
        }

        let user_info = self.get_user_info(access_token).await?;

        let Some(sub) = user_info.sub.filter(|sub| !sub.is_empty()) else {
            warn!("Google accepted the token but returned no subject");
            return Ok(None);
        };

        debug!("Validated Google identity {sub}");

        Ok(Some(GoogleIdentity {
            sub,
            email: user_info.email.unwrap_or_default(),
            email_verified: user_info.email_verified.unwrap_or(false),
            given_name: user_info.given_name.unwrap_or_default(),
            family_name: user_info.family_name.unwrap_or_default(),
        }))
    }
}

/// Google answers 400/401/403 for malformed, expired or revoked tokens. Any
/// other failure status is the provider misbehaving, not a verdict on the token.
fn rejection_or_failure(status: StatusCode, body: String) -> Error {
    let parsed: GoogleErrorBody = serde_json::from_str(&body).unwrap_or_default();

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let reason = parsed
                .error_description
                .or(parsed.error)
                .unwrap_or_else(|| "invalid or expired access token".to_string());
            info!("Google rejected access token ({status}): {reason}");
            Error::authentication(AuthenticationErrorKind::Rejected(format!(
                "Token error: {reason}"
            )))
        }
        _ => {
            warn!("Unexpected Google response {status}: {body}");
            Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
                    "Google responded with {status}"
                ))),
            }
        }
    }
}
