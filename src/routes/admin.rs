/// Admin area endpoints
///
/// Everything here sits behind the request gate, which has already
/// verified the access token and stored its claims on the request.

use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::{AccessClaims, Role};

#[derive(Serialize)]
pub struct AdminSession {
    pub success: bool,
    pub path: String,
    pub user: SessionUser,
    pub expires_at: i64,
}

#[derive(Serialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

/// GET /admin and /admin/{tail}
pub async fn admin_session(claims: web::ReqData<AccessClaims>, req: HttpRequest) -> HttpResponse {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(AdminSession {
        success: true,
        path: req.path().to_string(),
        expires_at: claims.exp,
        user: SessionUser {
            id: claims.data.sub,
            username: claims.data.username,
            role: claims.data.role,
        },
    })
}

/// GET /admin/login
///
/// Placeholder for the front-end login form; signed-in users never reach
/// it because the gate sends them back into the admin area.
pub async fn login_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(LOGIN_PAGE)
}

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>ReGuides Admin Login</title></head>
<body>
<form id="login">
  <input name="username" autocomplete="username">
  <input name="password" type="password" autocomplete="current-password">
  <button type="submit">Sign in</button>
</form>
</body>
</html>
"#;
