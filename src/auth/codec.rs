/// JWT Token Codec
///
/// Signs and verifies HS256 tokens with a single injected secret. The
/// signature is checked before any part of the token is parsed, so a
/// modified header, payload or signature is always reported as
/// `InvalidSignature`.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenPayload};
use crate::auth::clock::Clock;
use crate::error::AppError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    InvalidSignature,
    Expired,
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "token signature is invalid"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::Malformed => write!(f, "token is malformed"),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &[u8], issuer: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            clock,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Sign `payload` valid for `ttl_seconds` from the clock's current time
    pub fn sign<P: TokenPayload>(&self, payload: P, ttl_seconds: i64) -> Result<String, AppError> {
        self.sign_at(payload, self.now(), ttl_seconds)
    }

    /// Sign `payload` as if issued at `issued_at`
    ///
    /// Deterministic: identical payload, timestamp and secret produce an
    /// identical token.
    pub fn sign_at<P: TokenPayload>(
        &self,
        payload: P,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Result<String, AppError> {
        let claims = Claims {
            data: payload,
            typ: P::KIND,
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at + ttl_seconds,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify `token` against the clock's current time
    pub fn verify<P: TokenPayload>(&self, token: &str) -> Result<Claims<P>, TokenError> {
        self.verify_at(token, self.now())
    }

    /// Verify `token` as of `now`
    pub fn verify_at<P: TokenPayload>(&self, token: &str, now: i64) -> Result<Claims<P>, TokenError> {
        let (message, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;

        // HMAC recomputation with constant-time comparison
        let signature_valid =
            crypto::verify(signature, message.as_bytes(), &self.decoding_key, ALGORITHM)
                .map_err(|_| TokenError::InvalidSignature)?;
        if !signature_valid {
            return Err(TokenError::InvalidSignature);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims<P>>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)?;

        if claims.typ != P::KIND {
            return Err(TokenError::Malformed);
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
