//! Validation of access tokens issued by the hosted auth service.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. The `sub` claim
//! is the user's UUID; `aud` is `authenticated` for signed-in users.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tba_core::types::UserId;

/// Claims the server reads from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: UserId,
    /// Email, present for email sign-ins.
    #[serde(default)]
    pub email: Option<String>,
    /// Audience (`authenticated`).
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,
    /// Database role the row store applies (`authenticated`).
    #[serde(default)]
    pub role: Option<String>,
}

/// Configuration for access token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the auth service.
    pub secret: String,
    /// Required `aud` claim.
    pub audience: String,
}

/// Audience the auth service puts on signed-in users' tokens.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

impl JwtConfig {
    /// Load JWT configuration from environment variables (see [`crate::config::ServerConfig::from_env`]).
    ///
    /// | Env Var               | Required | Default         |
    /// |-----------------------|----------|-----------------|
    /// | `SUPABASE_JWT_SECRET` | **yes**  | --              |
    /// | `JWT_AUDIENCE`        | no       | `authenticated` |
    ///
    /// # Panics
    ///
    /// Panics if `SUPABASE_JWT_SECRET` is not set or is empty.
    pub fn from_vars<F>(var: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret =
            var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SUPABASE_JWT_SECRET must not be empty");

        let audience = var("JWT_AUDIENCE")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());

        Self { secret, audience }
    }
}

/// Sign an access token the way the auth service does.
///
/// Used by local tooling and tests; production tokens come from the auth service.
pub fn generate_access_token(
    user_id: UserId,
    email: Option<&str>,
    config: &JwtConfig,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.map(ToString::to_string),
        aud: config.audience.clone(),
        exp: now + ttl_secs,
        iat: Some(now),
        role: Some(DEFAULT_AUDIENCE.to_string()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration, and audience.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
