use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;
use serde_json::json;

use domain::error::{
    AuthenticationErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError,
    ExternalErrorKind, InternalErrorKind,
};

pub type Result<T> = core::result::Result<T, Error>;

pub(crate) const MISSING_TOKEN_MESSAGE: &str = "Token de acceso no proporcionado";
pub(crate) const INCOMPLETE_IDENTITY_MESSAGE: &str = "No se pudo autenticar con Google";
pub(crate) const INTERNAL_AUTH_MESSAGE: &str = "Error en la autenticación";

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    pub(crate) fn template(err: askama::Error) -> Self {
        Self(DomainError {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to render template".to_string(),
            )),
        })
    }

    pub(crate) fn session(err: impl StdError + Send + Sync + 'static) -> Self {
        Self(DomainError {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Session store failure".to_string(),
            )),
        })
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(ref internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    EntityErrorKind::Invalid => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                    }
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                    }
                    EntityErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT").into_response(),
                    EntityErrorKind::Other(_) => {
                        error!("Internal entity error: {:?}", self.0);
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    error!("Internal error: {:?}", self.0);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(ref external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => {
                    warn!("Upstream network error: {:?}", self.0);
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
                ExternalErrorKind::Other(_) => {
                    error!("External error: {:?}", self.0);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::Authentication(_) => {
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Failure of `POST /api/google-auth/`, rendered as `{"error": ...}`.
///
/// Only the three authentication outcomes reach the client verbatim; every
/// other failure is logged and reported with a fixed message.
#[derive(Debug)]
pub struct GoogleAuthError(DomainError);

impl IntoResponse for GoogleAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.error_kind {
            DomainErrorKind::Authentication(AuthenticationErrorKind::MissingCredential) => {
                (StatusCode::BAD_REQUEST, MISSING_TOKEN_MESSAGE.to_string())
            }
            DomainErrorKind::Authentication(AuthenticationErrorKind::Rejected(ref reason)) => {
                (StatusCode::BAD_REQUEST, reason.clone())
            }
            DomainErrorKind::Authentication(AuthenticationErrorKind::Incomplete) => {
                (StatusCode::BAD_REQUEST, INCOMPLETE_IDENTITY_MESSAGE.to_string())
            }
            _ => {
                error!("Google authentication failed: {:?}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_AUTH_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for GoogleAuthError
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
