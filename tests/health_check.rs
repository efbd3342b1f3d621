mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/health_check"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "reguides-auth");
}

#[tokio::test]
async fn health_check_ignores_session_cookies() {
    let app = spawn_app();

    let response = app
        .get_with_cookies("/health_check", &[("accessToken", "garbage")])
        .await;

    assert_eq!(200, response.status().as_u16());
}
