use crate::domain::User;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// How long an issued token stays valid.
pub const TOKEN_TTL_HOURS: i64 = 2;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Name of the authenticated user.
    #[serde(default)]
    pub username: String,
    /// Role at the time the token was issued ("admin" or "regular").
    #[serde(default)]
    pub role: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Anything that can mint an access token for a user.
///
/// The login handler only depends on this trait, so tests can swap in a stub.
pub trait TokenGenerator: Send + Sync {
    fn generate_token(&self, user: &User) -> Result<String, AppError>;
}

/// HMAC-SHA256 JWT issuer and verifier.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, chrono::Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Verifies a JWT string and decodes its claims.
    ///
    /// Any HMAC signature (HS256, HS384, HS512) made with the shared secret is
    /// accepted and `exp` is always checked. Every failure (malformed token, bad
    /// signature, non-HMAC algorithm, expiry) is reported as `AppError::Unauthorized`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

impl TokenGenerator for JwtService {
    fn generate_token(&self, user: &User) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?
            .timestamp() as usize;

        let claims = Claims {
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            exp: expiration,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }
}
