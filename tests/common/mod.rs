//! Shared harness: the real server on a random port, backed by the
//! in-memory identity store and a fixed clock.

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;

use reguides_auth::auth::{hash_password_with_cost, FixedClock, Role};
use reguides_auth::configuration::{Environment, GateSettings, JwtSettings};
use reguides_auth::startup::run;
use reguides_auth::state::AuthState;
use reguides_auth::store::{Identity, InMemoryIdentityStore};

pub const ADMIN_USERNAME: &str = "nahida";
pub const ADMIN_EMAIL: &str = "nahida@reguides.test";
pub const ADMIN_LOGIN: &str = "kusanali";
pub const ADMIN_DISPLAY_NAME: &str = "Lesser Lord";
pub const ADMIN_PASSWORD: &str = "Sumeru1Wisdom";

pub const RETIRED_USERNAME: &str = "dainsleif";
pub const RETIRED_PASSWORD: &str = "Khaenriah500Years";

pub const ACCESS_TTL: i64 = 900;
pub const REFRESH_TTL: i64 = 604_800;

const NOW: i64 = 1_700_000_000;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub clock: Arc<FixedClock>,
    pub store: Arc<InMemoryIdentityStore>,
    pub admin: Identity,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let admin = Identity::new(
        ADMIN_USERNAME,
        ADMIN_EMAIL,
        Role::Admin,
        hash_password_with_cost(ADMIN_PASSWORD, 4).unwrap(),
    )
    .with_login(ADMIN_LOGIN)
    .with_display_name(ADMIN_DISPLAY_NAME);
    let retired = Identity::new(
        RETIRED_USERNAME,
        "dainsleif@reguides.test",
        Role::Admin,
        hash_password_with_cost(RETIRED_PASSWORD, 4).unwrap(),
    )
    .deactivated();

    let store = Arc::new(InMemoryIdentityStore::with_identities(vec![
        admin.clone(),
        retired,
    ]));
    let clock = Arc::new(FixedClock::new(NOW));

    let jwt = JwtSettings {
        secret: Some("integration-test-secret-that-is-long-enough".to_string()),
        access_token_expiry: ACCESS_TTL,
        refresh_token_expiry: REFRESH_TTL,
        issuer: "reguides".to_string(),
    };
    let state = AuthState::new(&jwt, Environment::Test, store.clone(), clock.clone())
        .expect("Failed to build auth state");
    let policy = state.gate_policy(&GateSettings::default());

    let server = run(listener, state, policy).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        client,
        clock,
        store,
        admin,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in as the seeded admin and return the issued cookies
    pub async fn login_admin(&self) -> HashMap<String, Cookie<'static>> {
        let response = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200);
        set_cookies(&response)
    }

    pub async fn post_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self.client.post(self.url(path));
        if !cookies.is_empty() {
            request = request.header(reqwest::header::COOKIE, cookie_header(cookies));
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn get_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if !cookies.is_empty() {
            request = request.header(reqwest::header::COOKIE, cookie_header(cookies));
        }
        request.send().await.expect("Failed to execute request")
    }
}

fn cookie_header(cookies: &[(&str, &str)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every `Set-Cookie` of a response, by name
pub fn set_cookies(response: &reqwest::Response) -> HashMap<String, Cookie<'static>> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|value| {
            let cookie = Cookie::parse(value.to_str().unwrap().to_string())
                .expect("Malformed Set-Cookie header");
            (cookie.name().to_string(), cookie)
        })
        .collect()
}
