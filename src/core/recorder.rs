use crate::models::{BloodRequest, BloodRequestData, RequestStatus, Units};
use crate::ports::{RequestStore, StoreError};
use std::sync::Arc;

/// Writes normalized blood requests to the request store
#[derive(Clone)]
pub struct RequestRecorder {
    store: Arc<dyn RequestStore>,
}

impl RequestRecorder {
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self { store }
    }

    /// Build the stored record from validated request fields
    pub fn build(
        data: &BloodRequestData,
        blood_group: &str,
        hospital: &str,
        location: &str,
        requested_by: &str,
    ) -> BloodRequest {
        BloodRequest {
            name: data.name.clone(),
            blood_group: blood_group.to_string(),
            units: data.units.clone(),
            date: data.date.clone(),
            time: data.time.clone(),
            gender: data.gender.clone(),
            hospital: hospital.to_string(),
            location: location.to_string(),
            phone: data.phone.clone(),
            requested_by: requested_by.to_string(),
            status: RequestStatus::Active,
            created_at: chrono::Utc::now(),
        }
    }

    /// Append the request and return its generated id
    pub async fn record(&self, request: &BloodRequest) -> Result<String, StoreError> {
        let request_id = self.store.append(request).await?;

        tracing::info!(
            "Recorded {} request {} at {} (requested by {})",
            request.blood_group,
            request_id,
            request.hospital,
            request.requested_by
        );

        Ok(request_id)
    }
}
