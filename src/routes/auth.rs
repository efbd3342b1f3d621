/// Authentication Routes
///
/// Login, logout, token refresh and token verification for the admin
/// panel. Tokens travel in `accessToken` / `refreshToken` cookies.

use actix_web::{error::JsonPayloadError, http::header, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AccessPayload, Role, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::state::AuthState;
use crate::store::Identity;

/// Login request; `username` may also be an email, login alias or
/// display name
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    fn credentials(&self) -> Result<(&str, &str), AuthError> {
        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok((username, password))
    }
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<&Identity> for UserSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            username: identity.username.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct VerifiedUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub valid: bool,
    pub user: VerifiedUser,
}

/// Maps JSON extractor failures onto the structured 400 body; serde's
/// detail only goes to the log.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!(error = %err, "Rejected request body");
    AppError::from(ValidationError::InvalidFormat("request body".to_string())).into()
}

/// POST /api/auth/login
///
/// # Errors
/// - 400: username or password missing
/// - 401: unknown login, inactive account or wrong password (one message)
/// - 500: internal error
pub async fn login(
    form: web::Json<LoginRequest>,
    state: web::Data<AuthState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("admin_login");
    let (username, password) = form.credentials()?;

    let identity = state
        .validator
        .validate(username, password)
        .await
        .map_err(|e| {
            context.log_cause(&e);
            AppError::from(e)
        })?;

    let pair = state.issuer.issue(&identity)?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %identity.id,
        "Admin logged in"
    );

    Ok(HttpResponse::Ok()
        .cookie(state.cookies.access(&pair))
        .cookie(state.cookies.refresh(&pair))
        .json(SessionResponse {
            success: true,
            user: UserSummary::from(&identity),
        }))
}

/// POST /api/auth/logout
///
/// Always succeeds. Clears both cookies and, when the refresh cookie still
/// verifies, revokes every outstanding refresh token of its owner.
pub async fn logout(req: HttpRequest, state: web::Data<AuthState>) -> HttpResponse {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        if let Err(e) = state.rotator.revoke(cookie.value()).await {
            tracing::error!(error = %e, "Failed to revoke refresh tokens on logout");
        }
    }

    HttpResponse::Ok()
        .cookie(state.cookies.cleared(ACCESS_COOKIE))
        .cookie(state.cookies.cleared(REFRESH_COOKIE))
        .json(LogoutResponse { success: true })
}

/// POST /api/auth/refresh
///
/// Rotates the pair held in the `refreshToken` cookie. Failures leave the
/// cookies untouched.
///
/// # Errors
/// - 401: missing, invalid, expired or revoked refresh token
/// - 500/503: identity store failure
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AuthState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");
    let cookie = req.cookie(REFRESH_COOKIE);

    let (identity, pair) = state
        .rotator
        .rotate(cookie.as_ref().map(|c| c.value()))
        .await
        .map_err(|e| {
            context.log_cause(&e);
            AppError::from(e)
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %identity.id,
        "Token pair refreshed"
    );

    Ok(HttpResponse::Ok()
        .cookie(state.cookies.access(&pair))
        .cookie(state.cookies.refresh(&pair))
        .json(SessionResponse {
            success: true,
            user: UserSummary::from(&identity),
        }))
}

/// GET|POST /api/auth/verify
///
/// Accepts the access token from the `accessToken` cookie or an
/// `Authorization: Bearer` header. A non-empty cookie always wins, even
/// when it fails to verify; the header is only read when no cookie is sent.
///
/// # Errors
/// - 401: no token, or the token is invalid or expired
pub async fn verify(req: HttpRequest, state: web::Data<AuthState>) -> Result<HttpResponse, AppError> {
    let token = req
        .cookie(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(&req))
        .ok_or(AuthError::MissingToken)?;

    let claims = state.codec.verify::<AccessPayload>(&token).map_err(|e| {
        tracing::debug!(reason = %e, "Access token rejected");
        AppError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(VerifyResponse {
        success: true,
        valid: true,
        user: VerifiedUser {
            id: claims.data.sub,
            username: claims.data.username,
            role: claims.data.role,
        },
    }))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
