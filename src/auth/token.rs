use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id rendered as a string.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed payload, missing subject or expired.
    #[error("invalid token")]
    Invalid,
    #[error("{0}")]
    Issue(String),
}

/// Issues and verifies signed, time-bound identity tokens.
///
/// Keys and algorithm are fixed when the service is built at startup; nothing
/// is read from the environment per request.
pub struct TokenService {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, ttl: Duration) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            header: Header::new(algorithm),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_algorithm,
            Duration::minutes(config.access_token_expire_minutes),
        )
    }

    /// Lifetime applied to tokens issued at login.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Produces a signed token carrying `{sub: subject, exp: now + ttl}`.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Issue(format!("token lifetime out of range: {}", ttl)))?
            .timestamp()
            .max(0) as usize;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    /// Verifies signature and expiry, returning the subject claim.
    pub fn decode(&self, token: &str) -> Result<String, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("rejected token: {}", e);
                TokenError::Invalid
            })?;

        if claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }
        Ok(claims.sub)
    }
}
