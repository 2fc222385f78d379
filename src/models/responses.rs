use serde::{Deserialize, Serialize};

/// Result of a handled blood request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub success: bool,
    /// Number of donors a notification was attempted for
    #[serde(rename = "notificationsSent")]
    pub notifications_sent: usize,
    #[serde(rename = "notificationsFailed")]
    pub notifications_failed: usize,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
