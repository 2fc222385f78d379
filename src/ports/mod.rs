//! # Ports
//!
//! Traits for the external collaborators a blood request touches.
//! The core only talks to these; `services` holds the concrete clients.

use crate::models::{BloodRequest, DonorRecord, PushMessage};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Donor directory error: {0}")]
pub struct DirectoryError(pub String);

#[derive(Debug, Error)]
#[error("Request store error: {0}")]
pub struct StoreError(pub String);

#[derive(Debug, Error)]
#[error("Push delivery error: {0}")]
pub struct PushError(pub String);

#[derive(Debug, Error)]
#[error("Geocoding error: {0}")]
pub struct GeocodeError(pub String);

/// Best geocoding match, kept as the provider's decimal strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
}

/// Read access to users flagged as donors
#[async_trait]
pub trait DonorDirectory: Send + Sync {
    async fn active_donors(&self) -> Result<Vec<DonorRecord>, DirectoryError>;
}

/// Append-only store for blood requests
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist the request and return its generated identifier
    async fn append(&self, request: &BloodRequest) -> Result<String, StoreError>;
}

/// Push notification delivery
#[async_trait]
pub trait PushService: Send + Sync {
    /// Send one message and return the provider's message id
    async fn send(&self, message: &PushMessage) -> Result<String, PushError>;
}

/// Address to coordinate lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service found no match
    async fn lookup(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError>;
}
