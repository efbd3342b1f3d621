mod common;

use actix_web::cookie::{time::Duration, SameSite};
use serde_json::{json, Value};

use common::*;

const ACCESS: &str = "accessToken";
const REFRESH: &str = "refreshToken";

// --- Login ---

#[tokio::test]
async fn login_sets_both_session_cookies() {
    let app = spawn_app();

    let response = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(200, response.status().as_u16());

    let cookies = set_cookies(&response);
    for (name, ttl) in [(ACCESS, ACCESS_TTL), (REFRESH, REFRESH_TTL)] {
        let cookie = cookies.get(name).unwrap_or_else(|| panic!("{} not set", name));
        assert!(!cookie.value().is_empty());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(ttl)));
        // Not production: plain http must keep working
        assert_ne!(cookie.secure(), Some(true));
    }

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["username"], json!(ADMIN_USERNAME));
    assert_eq!(body["user"]["id"], json!(app.admin.id.to_string()));
    assert!(body.get("accessToken").is_none());
    assert!(body.get("refreshToken").is_none());
}

#[tokio::test]
async fn login_accepts_every_identifier() {
    let app = spawn_app();

    for login in [ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_LOGIN, ADMIN_DISPLAY_NAME] {
        let response = app.login(login, ADMIN_PASSWORD).await;
        assert_eq!(200, response.status().as_u16(), "login by {:?} failed", login);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["user"]["username"], json!(ADMIN_USERNAME));
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    let cases = [
        (ADMIN_USERNAME, "Sumeru1Wisdon", "wrong password"),
        ("alhaitham", ADMIN_PASSWORD, "unknown user"),
        (RETIRED_USERNAME, RETIRED_PASSWORD, "inactive user"),
    ];

    let mut messages = Vec::new();
    for (username, password, case) in cases {
        let response = app.login(username, password).await;
        assert_eq!(401, response.status().as_u16(), "{}", case);
        assert!(set_cookies(&response).is_empty(), "{} set cookies", case);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("INVALID_CREDENTIALS"), "{}", case);
        messages.push(body["message"].clone());
    }

    assert!(messages.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn login_returns_400_when_fields_are_missing() {
    let app = spawn_app();
    let cases = [
        (json!({}), "missing both"),
        (json!({ "username": ADMIN_USERNAME }), "missing password"),
        (json!({ "password": ADMIN_PASSWORD }), "missing username"),
        (json!({ "username": "", "password": ADMIN_PASSWORD }), "empty username"),
        (json!({ "username": ADMIN_USERNAME, "password": "" }), "empty password"),
    ];

    for (body, case) in cases {
        let response = app
            .client
            .post(app.url("/api/auth/login"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(400, response.status().as_u16(), "{}", case);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], json!("MISSING_CREDENTIALS"), "{}", case);
    }
}

#[tokio::test]
async fn login_returns_structured_400_for_malformed_bodies() {
    let app = spawn_app();
    let cases = [
        (r#"{"username": 5, "password": "x"}"#, "wrong field type"),
        (r#"{"username": "nahida", "password""#, "truncated json"),
        ("not json", "not json"),
    ];

    for (raw, case) in cases {
        let response = app
            .client
            .post(app.url("/api/auth/login"))
            .header("Content-Type", "application/json")
            .body(raw)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(400, response.status().as_u16(), "{}", case);
        let body: Value = response.json().await.expect("body is not JSON");
        assert_eq!(body["success"], json!(false), "{}", case);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"), "{}", case);
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("invalid type"), "{}: {}", case, message);
        assert!(!message.contains("line"), "{}: {}", case, message);
    }
}

// --- Verify ---

#[tokio::test]
async fn verify_accepts_cookie_or_bearer_header() {
    let app = spawn_app();
    let cookies = app.login_admin().await;
    let access = cookies[ACCESS].value();

    let by_cookie = app.post_with_cookies("/api/auth/verify", &[(ACCESS, access)]).await;
    assert_eq!(200, by_cookie.status().as_u16());
    let body: Value = by_cookie.json().await.unwrap();
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["user"]["id"], json!(app.admin.id.to_string()));
    assert_eq!(body["user"]["username"], json!(ADMIN_USERNAME));
    assert_eq!(body["user"]["role"], json!("admin"));

    let by_header = app
        .client
        .get(app.url("/api/auth/verify"))
        .bearer_auth(access)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, by_header.status().as_u16());
}

#[tokio::test]
async fn verify_rejects_missing_invalid_and_expired_tokens() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app.post_with_cookies("/api/auth/verify", &[]).await;
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], json!("MISSING_TOKEN"));

    let refresh = cookies[REFRESH].value();
    for (token, case) in [("garbage", "garbage"), (refresh, "refresh token")] {
        let response = app.post_with_cookies("/api/auth/verify", &[(ACCESS, token)]).await;
        assert_eq!(401, response.status().as_u16(), "{}", case);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], json!("TOKEN_INVALID"), "{}", case);
    }

    app.clock.advance(ACCESS_TTL);
    let response = app
        .post_with_cookies("/api/auth/verify", &[(ACCESS, cookies[ACCESS].value())])
        .await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn verify_prefers_cookie_over_bearer_header() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app
        .client
        .get(app.url("/api/auth/verify"))
        .header("Cookie", format!("{}=garbage", ACCESS))
        .bearer_auth(cookies[ACCESS].value())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], json!("TOKEN_INVALID"));

    let response = app
        .client
        .get(app.url("/api/auth/verify"))
        .header("Cookie", format!("{}=", ACCESS))
        .bearer_auth(cookies[ACCESS].value())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());
}

// --- Refresh ---

#[tokio::test]
async fn refresh_rotates_the_pair() {
    let app = spawn_app();
    let first = app.login_admin().await;

    app.clock.advance(ACCESS_TTL + 1);
    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, first[REFRESH].value())])
        .await;
    assert_eq!(200, response.status().as_u16());

    let second = set_cookies(&response);
    assert_ne!(second[ACCESS].value(), first[ACCESS].value());
    assert_ne!(second[REFRESH].value(), first[REFRESH].value());
    assert_eq!(second[ACCESS].max_age(), Some(Duration::seconds(ACCESS_TTL)));
    assert_eq!(second[REFRESH].max_age(), Some(Duration::seconds(REFRESH_TTL)));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["username"], json!(ADMIN_USERNAME));

    let response = app
        .post_with_cookies("/api/auth/verify", &[(ACCESS, second[ACCESS].value())])
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn refreshed_token_cannot_be_replayed() {
    let app = spawn_app();
    let first = app.login_admin().await;

    app.clock.advance(1);
    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, first[REFRESH].value())])
        .await;
    assert_eq!(200, response.status().as_u16());

    let replay = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, first[REFRESH].value())])
        .await;
    assert_eq!(401, replay.status().as_u16());
    assert!(set_cookies(&replay).is_empty());
    let body: Value = replay.json().await.unwrap();
    assert_eq!(body["code"], json!("REFRESH_TOKEN_INVALID"));
}

#[tokio::test]
async fn refresh_fails_without_a_valid_refresh_token() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app.post_with_cookies("/api/auth/refresh", &[]).await;
    assert_eq!(401, response.status().as_u16());
    assert!(set_cookies(&response).is_empty());

    // An access token is not a refresh token
    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, cookies[ACCESS].value())])
        .await;
    assert_eq!(401, response.status().as_u16());

    app.clock.advance(REFRESH_TTL);
    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, cookies[REFRESH].value())])
        .await;
    assert_eq!(401, response.status().as_u16());
    assert!(set_cookies(&response).is_empty());
}

// --- Logout ---

#[tokio::test]
async fn logout_clears_cookies_and_revokes_refresh_token() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app
        .post_with_cookies(
            "/api/auth/logout",
            &[(ACCESS, cookies[ACCESS].value()), (REFRESH, cookies[REFRESH].value())],
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let cleared = set_cookies(&response);
    for name in [ACCESS, REFRESH] {
        let cookie = cleared.get(name).unwrap_or_else(|| panic!("{} not cleared", name));
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, cookies[REFRESH].value())])
        .await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn logout_succeeds_without_a_session() {
    let app = spawn_app();

    for cookies in [vec![], vec![(REFRESH, "garbage")]] {
        let response = app.post_with_cookies("/api/auth/logout", &cookies).await;
        assert_eq!(200, response.status().as_u16());
        assert_eq!(set_cookies(&response).len(), 2);
    }
}
