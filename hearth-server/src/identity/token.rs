use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::models::ApplicationUser;
use crate::config::JwtConfig;

/// HS512 wants a key at least as long as its output.
pub const MIN_KEY_BYTES: usize = 64;

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("No JWT signing key configured")]
    MissingKey,
    #[error("JWT signing key must be at least {MIN_KEY_BYTES} bytes, got {0}")]
    KeyTooShort(usize),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    /// User id
    pub nameid: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Issues and checks the bearer tokens of the secure API.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        let key = config.key.as_deref().ok_or(TokenError::MissingKey)?;
        if key.len() < MIN_KEY_BYTES {
            return Err(TokenError::KeyTooShort(key.len()));
        }
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: Duration::minutes(config.duration_in_minutes),
        })
    }

    pub fn create_token(&self, user: &ApplicationUser) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            email: user.email.clone(),
            nameid: user.user_id.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.encoding,
        )?)
    }

    /// Check signature, issuer, audience and lifetime.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        Ok(jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}
