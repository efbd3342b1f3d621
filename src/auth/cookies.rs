/// Session cookies
///
/// Both tokens travel as `HttpOnly`, `SameSite=Strict` cookies scoped to
/// `/`; `Secure` is set in production.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

use crate::auth::issuer::TokenPair;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn access(&self, pair: &TokenPair) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, pair.access_token.clone(), pair.access_expires_in)
    }

    pub fn refresh(&self, pair: &TokenPair) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, pair.refresh_token.clone(), pair.refresh_expires_in)
    }

    /// Empty cookie with `Max-Age=0`
    pub fn cleared(&self, name: &'static str) -> Cookie<'static> {
        self.build(name, String::new(), 0)
    }

    fn build(&self, name: &'static str, value: String, max_age: i64) -> Cookie<'static> {
        Cookie::build(name, value)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(Duration::seconds(max_age))
            .finish()
    }
}
