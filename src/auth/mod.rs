/// Authentication module
///
/// Token signing/verification, credential checks, token pair issuance,
/// refresh rotation and session cookies.

mod claims;
mod clock;
mod codec;
mod cookies;
mod credentials;
mod issuer;
mod password;
mod refresh_token;

pub use claims::{AccessClaims, AccessPayload, Claims, RefreshClaims, RefreshPayload, Role, TokenKind, TokenPayload};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{TokenCodec, TokenError};
pub use cookies::{CookiePolicy, ACCESS_COOKIE, REFRESH_COOKIE};
pub use credentials::{CredentialError, CredentialValidator};
pub use issuer::{TokenPair, TokenPairIssuer};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use refresh_token::{RefreshError, RefreshRotator};
