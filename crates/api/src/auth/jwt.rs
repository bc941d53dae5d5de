//! Session-token generation and validation.
//!
//! A session token is an HS256-signed JWT carrying the user's identity
//! claims. Only its SHA-256 hash is stored in the `sessions` table, so a
//! database leak does not expose usable tokens. The JWT `exp` is a coarse
//! upper bound on total session life; per-request validity is decided by the
//! sliding session lease in the database.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use scribepad_core::types::DbId;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's login name, echoed into lock-holder broadcasts.
    pub username: String,
    /// The user's role name (`"admin"`, `"user"`, `"guest"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for JWT generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Hard upper bound on a token's life in hours (default: 24). The
    /// sliding session lease expires tokens much earlier when idle.
    pub token_lifetime_hours: i64,
}

/// Default token lifetime bound in hours.
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_TOKEN_LIFETIME_HOURS` | no       | `24`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_lifetime_hours: i64 = std::env::var("JWT_TOKEN_LIFETIME_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_LIFETIME_HOURS.to_string())
            .parse()
            .expect("JWT_TOKEN_LIFETIME_HOURS must be a valid i64");

        Self {
            secret,
            token_lifetime_hours,
        }
    }
}

/// Generate an HS256 session token for the given user.
pub fn generate_session_token(
    user_id: DbId,
    username: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.token_lifetime_hours * 3600;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration automatically. Passing this check
/// alone is not enough to be authenticated -- the session lease in the
/// database must also be live.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Compute the SHA-256 hex digest of a session token.
///
/// This digest is what the `sessions` table stores and what lease lookups
/// key on.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
