//! JSON endpoints under `/api/`.

pub(crate) mod google_auth_controller;
pub(crate) mod user_controller;
