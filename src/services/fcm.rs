use super::google_auth::{FcmCredentials, GoogleAuthError};
use crate::models::PushMessage;
use crate::ports::{PushError, PushService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when sending through Firebase Cloud Messaging
#[derive(Debug, Error)]
pub enum FcmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("FCM returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No access token: {0}")]
    Auth(#[from] GoogleAuthError),
}

impl From<FcmError> for PushError {
    fn from(e: FcmError) -> Self {
        PushError(e.to_string())
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a PushMessage,
}

#[derive(Deserialize)]
struct SendResponse {
    name: String,
}

/// FCM HTTP v1 client
pub struct FcmClient {
    endpoint: String,
    project_id: String,
    credentials: FcmCredentials,
    client: Client,
}

impl FcmClient {
    pub fn new(
        endpoint: String,
        project_id: String,
        credentials: FcmCredentials,
        timeout: Duration,
    ) -> Result<Self, FcmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            project_id,
            credentials,
            client,
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Send a message and return the message name assigned by FCM
    pub async fn send_message(&self, message: &PushMessage) -> Result<String, FcmError> {
        let access_token = self.credentials.access_token(&self.client).await?;

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&SendRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(FcmError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| FcmError::InvalidResponse(e.to_string()))?;

        Ok(sent.name)
    }
}

#[async_trait]
impl PushService for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        Ok(self.send_message(message).await?)
    }
}
