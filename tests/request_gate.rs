mod common;

use reqwest::header::LOCATION;
use serde_json::{json, Value};

use common::*;

const ACCESS: &str = "accessToken";
const REFRESH: &str = "refreshToken";

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn protected_paths_redirect_without_a_valid_token() {
    let app = spawn_app();
    let cookies = app.login_admin().await;
    let refresh = cookies[REFRESH].value();

    let cases: [(&[(&str, &str)], &str); 4] = [
        (&[], "no cookie"),
        (&[(ACCESS, "")], "empty cookie"),
        (&[(ACCESS, "garbage")], "garbage token"),
        (&[(ACCESS, refresh)], "refresh token"),
    ];

    for path in ["/admin", "/admin/", "/admin/characters/nahida"] {
        for (cookies, case) in cases {
            let response = app.get_with_cookies(path, cookies).await;
            assert_eq!(307, response.status().as_u16(), "{} {}", path, case);
            assert_eq!(location(&response), "/admin/login", "{} {}", path, case);
            assert!(common::set_cookies(&response).is_empty());
        }
    }
}

#[tokio::test]
async fn protected_paths_pass_with_a_valid_token() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app
        .get_with_cookies("/admin/characters", &[(ACCESS, cookies[ACCESS].value())])
        .await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["path"], json!("/admin/characters"));
    assert_eq!(body["user"]["username"], json!(ADMIN_USERNAME));
    assert_eq!(body["user"]["id"], json!(app.admin.id.to_string()));
}

#[tokio::test]
async fn login_page_redirects_signed_in_users() {
    let app = spawn_app();

    let response = app.get_with_cookies("/admin/login", &[]).await;
    assert_eq!(200, response.status().as_u16());
    assert!(response.text().await.unwrap().contains("<form"));

    let response = app
        .get_with_cookies("/admin/login", &[(ACCESS, "garbage")])
        .await;
    assert_eq!(200, response.status().as_u16());

    let cookies = app.login_admin().await;
    let response = app
        .get_with_cookies("/admin/login", &[(ACCESS, cookies[ACCESS].value())])
        .await;
    assert_eq!(307, response.status().as_u16());
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn login_page_accepts_trailing_slash() {
    let app = spawn_app();

    let response = app.get_with_cookies("/admin/login/", &[]).await;
    assert_eq!(200, response.status().as_u16());
    assert!(response.text().await.unwrap().contains("<form"));

    let response = app
        .get_with_cookies("/admin/login/", &[(ACCESS, "garbage")])
        .await;
    assert_eq!(200, response.status().as_u16());

    let cookies = app.login_admin().await;
    let response = app
        .get_with_cookies("/admin/login/", &[(ACCESS, cookies[ACCESS].value())])
        .await;
    assert_eq!(307, response.status().as_u16());
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn expired_access_token_is_treated_as_signed_out() {
    let app = spawn_app();
    let cookies = app.login_admin().await;
    let access = cookies[ACCESS].value();

    app.clock.advance(ACCESS_TTL);

    let response = app.get_with_cookies("/admin", &[(ACCESS, access)]).await;
    assert_eq!(307, response.status().as_u16());
    assert_eq!(location(&response), "/admin/login");

    let response = app.get_with_cookies("/admin/login", &[(ACCESS, access)]).await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn refresh_restores_access_after_expiry() {
    let app = spawn_app();
    let first = app.login_admin().await;

    app.clock.advance(ACCESS_TTL + 60);
    let response = app
        .post_with_cookies("/api/auth/refresh", &[(REFRESH, first[REFRESH].value())])
        .await;
    assert_eq!(200, response.status().as_u16());
    let second = set_cookies(&response);

    let response = app
        .get_with_cookies("/admin", &[(ACCESS, second[ACCESS].value())])
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn logout_closes_the_admin_area() {
    let app = spawn_app();
    let cookies = app.login_admin().await;

    let response = app
        .post_with_cookies(
            "/api/auth/logout",
            &[(ACCESS, cookies[ACCESS].value()), (REFRESH, cookies[REFRESH].value())],
        )
        .await;
    let cleared = set_cookies(&response);

    // What a browser sends after applying the cleared cookies
    let response = app
        .get_with_cookies("/admin", &[(ACCESS, cleared[ACCESS].value())])
        .await;
    assert_eq!(307, response.status().as_u16());
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn api_routes_are_not_gated() {
    let app = spawn_app();

    for path in ["/api/auth/verify", "/administrator"] {
        let response = app.get_with_cookies(path, &[]).await;
        assert_ne!(307, response.status().as_u16(), "{} was gated", path);
    }
}
