pub(crate) mod access_token;
pub(crate) mod authenticated_user;
pub(crate) mod token_user;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
