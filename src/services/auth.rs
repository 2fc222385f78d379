use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CallerClaims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies HS256 bearer tokens and yields the caller's user id
///
/// This only identifies the caller; a missing or bad token never blocks a
/// request.
#[derive(Clone)]
pub struct CallerTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CallerTokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Return the `sub` claim of a valid token
    pub fn caller_id(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<CallerClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| TokenError::Invalid(format!("{err}")))?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Invalid("empty subject".to_string()));
        }

        Ok(data.claims.sub)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
