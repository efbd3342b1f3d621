mod admin;
mod auth;
mod health_check;

pub use admin::{admin_session, login_page};
pub use auth::{json_error_handler, login, logout, refresh, verify, LoginRequest};
pub use health_check::health_check;
