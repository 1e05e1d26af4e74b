use crate::error::{Error, Result};
use askama::Template;
use axum::response::Html;
use domain::user::SignupErrors;

#[derive(Template)]
#[template(path = "home.html")]
pub(crate) struct HomeTemplate {
    pub username: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub(crate) struct SignupTemplate {
    pub username: String,
    pub errors: SignupErrors,
}

#[derive(Template)]
#[template(path = "login.html")]
pub(crate) struct LoginTemplate {
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub(crate) struct ProfileTemplate {
    pub username: String,
    pub email: String,
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>> {
    template.render().map(Html).map_err(Error::template)
}
