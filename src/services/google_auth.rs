//! OAuth2 access tokens for the FCM HTTP v1 API.
//!
//! Google access tokens expire after about an hour. A service account key is
//! exchanged for a fresh token through the JWT bearer grant shortly before the
//! cached one runs out.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Failed to read service account key: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a Google service account JSON key that token minting needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, GoogleAuthError> {
        serde_json::from_str(json).map_err(|e| GoogleAuthError::InvalidKey(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GoogleAuthError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Mints and caches access tokens for one service account
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey) -> Result<Self, GoogleAuthError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GoogleAuthError::InvalidKey(e.to_string()))?;

        Ok(Self {
            key,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, minting a new one when the cached token is near expiry
    pub async fn access_token(&self, client: &Client) -> Result<String, GoogleAuthError> {
        // Held across the exchange so concurrent sends share one refresh
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let fresh = self.mint(client).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn mint(&self, client: &Client) -> Result<CachedToken, GoogleAuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        let response = client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(GoogleAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);

        tracing::info!(
            "Minted FCM access token for {} (expires in {}s)",
            self.key.client_email,
            token.expires_in
        );

        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

/// How the FCM client authenticates
pub enum FcmCredentials {
    /// Pre-issued access token; stops working once Google expires it (about an hour)
    Static(String),
    ServiceAccount(ServiceAccountTokens),
}

impl FcmCredentials {
    pub fn service_account(key: ServiceAccountKey) -> Result<Self, GoogleAuthError> {
        Ok(FcmCredentials::ServiceAccount(ServiceAccountTokens::new(key)?))
    }

    pub async fn access_token(&self, client: &Client) -> Result<String, GoogleAuthError> {
        match self {
            FcmCredentials::Static(token) => Ok(token.clone()),
            FcmCredentials::ServiceAccount(tokens) => tokens.access_token(client).await,
        }
    }
}
