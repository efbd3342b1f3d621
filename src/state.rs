/// Shared request state
///
/// Everything handlers need, built once at startup with the secret and
/// clock injected explicitly.

use std::sync::Arc;

use crate::auth::{
    Clock, CookiePolicy, CredentialValidator, RefreshRotator, TokenCodec, TokenPairIssuer,
};
use crate::configuration::{Environment, GateSettings, JwtSettings};
use crate::error::ConfigError;
use crate::middleware::GatePolicy;
use crate::store::IdentityStore;

#[derive(Clone)]
pub struct AuthState {
    pub codec: TokenCodec,
    pub validator: CredentialValidator,
    pub issuer: TokenPairIssuer,
    pub rotator: RefreshRotator,
    pub cookies: CookiePolicy,
}

impl AuthState {
    /// # Errors
    /// Fails when the secret cannot be resolved for `environment` or the
    /// token lifetimes are inconsistent
    pub fn new(
        jwt: &JwtSettings,
        environment: Environment,
        store: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let secret = jwt.signing_secret(environment)?;
        jwt.validate_lifetimes()?;

        let codec = TokenCodec::new(secret.as_bytes(), jwt.issuer.clone(), clock);
        let issuer = TokenPairIssuer::new(
            codec.clone(),
            jwt.access_token_expiry,
            jwt.refresh_token_expiry,
        );

        Ok(Self {
            validator: CredentialValidator::new(store.clone()),
            rotator: RefreshRotator::new(codec.clone(), issuer.clone(), store),
            issuer,
            cookies: CookiePolicy::new(environment.is_production()),
            codec,
        })
    }

    pub fn gate_policy(&self, gate: &GateSettings) -> GatePolicy {
        GatePolicy::new(gate, self.codec.clone())
    }
}
