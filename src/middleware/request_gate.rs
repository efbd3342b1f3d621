/// Request Gate Middleware
///
/// Guards the admin area. Every request under the protected prefix must
/// carry a verifiable `accessToken` cookie or it is redirected to the login
/// page; an already signed-in user asking for the login page is sent into
/// the admin area instead. Cookies are never touched here.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{AccessClaims, AccessPayload, TokenCodec, ACCESS_COOKIE};
use crate::configuration::GateSettings;

/// Authentication state of a gated request before a decision is made
enum GateState<'a> {
    Unauthenticated,
    TokenPresentUnverified(&'a str),
    Authorized(AccessClaims),
}

/// What the gate does with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Outside the gate, or the login page for a signed-out user
    Proceed,
    /// Protected path with a valid access token
    Authorized(AccessClaims),
    RedirectToLogin,
    RedirectToApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Public,
    LoginBoundary,
    Protected,
}

#[derive(Clone)]
pub struct GatePolicy {
    protected_prefix: String,
    login_path: String,
    app_path: String,
    codec: TokenCodec,
}

impl GatePolicy {
    pub fn new(settings: &GateSettings, codec: TokenCodec) -> Self {
        Self {
            protected_prefix: settings.protected_prefix.trim_end_matches('/').to_string(),
            login_path: settings.login_path.trim_end_matches('/').to_string(),
            app_path: settings.app_path.clone(),
            codec,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn app_path(&self) -> &str {
        &self.app_path
    }

    fn classify(&self, path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');

        if trimmed == self.login_path {
            Route::LoginBoundary
        } else if trimmed == self.protected_prefix
            || path
                .strip_prefix(self.protected_prefix.as_str())
                .map_or(false, |rest| rest.starts_with('/'))
        {
            Route::Protected
        } else {
            Route::Public
        }
    }

    /// Decide what happens to a request for `path` carrying `access_token`
    pub fn evaluate(&self, path: &str, access_token: Option<&str>) -> GateDecision {
        let route = self.classify(path);
        if route == Route::Public {
            return GateDecision::Proceed;
        }

        let mut state = match access_token {
            Some(token) if !token.is_empty() => GateState::TokenPresentUnverified(token),
            _ => GateState::Unauthenticated,
        };

        if let GateState::TokenPresentUnverified(token) = state {
            state = match self.codec.verify::<AccessPayload>(token) {
                Ok(claims) => GateState::Authorized(claims),
                Err(e) => {
                    tracing::debug!(path = %path, reason = %e, "Access token rejected by gate");
                    GateState::Unauthenticated
                }
            };
        }

        match (route, state) {
            (Route::Protected, GateState::Authorized(claims)) => GateDecision::Authorized(claims),
            (Route::Protected, _) => GateDecision::RedirectToLogin,
            (_, GateState::Authorized(_)) => GateDecision::RedirectToApp,
            _ => GateDecision::Proceed,
        }
    }
}

/// Gate middleware, wrapped around the whole application
pub struct RequestGate {
    policy: GatePolicy,
}

impl RequestGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestGateService {
            service: Rc::new(service),
            policy: Rc::new(self.policy.clone()),
        }))
    }
}

pub struct RequestGateService<S> {
    service: Rc<S>,
    policy: Rc<GatePolicy>,
}

impl<S, B> Service<ServiceRequest> for RequestGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let access_cookie = req.cookie(ACCESS_COOKIE);
        let decision = self
            .policy
            .evaluate(req.path(), access_cookie.as_ref().map(|c| c.value()));

        let location = match decision {
            GateDecision::Proceed => None,
            GateDecision::Authorized(claims) => {
                tracing::debug!(
                    user_id = %claims.data.sub,
                    path = %req.path(),
                    "Admin request authorized"
                );
                req.extensions_mut().insert(claims);
                None
            }
            GateDecision::RedirectToLogin => Some(self.policy.login_path().to_string()),
            GateDecision::RedirectToApp => Some(self.policy.app_path().to_string()),
        };

        match location {
            None => {
                let service = self.service.clone();
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Some(location) => {
                tracing::info!(path = %req.path(), location = %location, "Gate redirect");
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, location))
                    .finish();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
