pub(crate) mod api;
pub(crate) mod health_check_controller;
pub(crate) mod home_controller;
pub(crate) mod login_controller;
pub(crate) mod logout_controller;
pub(crate) mod profile_controller;
pub(crate) mod signup_controller;
