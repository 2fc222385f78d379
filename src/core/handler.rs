use crate::core::{
    dispatcher::{NotificationContext, NotificationDispatcher},
    geo::GeoResolver,
    matcher::DonorMatcher,
    recorder::RequestRecorder,
};
use crate::models::{Coordinate, CreateBloodRequest, RequestSummary};
use crate::ports::{DirectoryError, DonorDirectory, PushService, RequestStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Identity recorded when neither the caller nor the payload names a user
pub const ANONYMOUS: &str = "anonymous";

/// Errors surfaced to the caller of a blood request
#[derive(Debug, Error)]
pub enum RequestError {
    /// Caller-correctable problem with the payload
    #[error("{0}")]
    InvalidArgument(String),

    /// Any other failure while handling the request
    #[error("{0}")]
    Internal(String),
}

impl RequestError {
    /// Wire name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::InvalidArgument(_) => "invalid-argument",
            RequestError::Internal(_) => "internal",
        }
    }
}

impl From<DirectoryError> for RequestError {
    fn from(e: DirectoryError) -> Self {
        RequestError::Internal(e.to_string())
    }
}

impl From<StoreError> for RequestError {
    fn from(e: StoreError) -> Self {
        RequestError::Internal(e.to_string())
    }
}

/// Pick the requesting identity: authenticated caller, then payload, then anonymous
pub fn resolve_identity(caller: Option<&str>, payload_user_id: Option<&str>) -> String {
    let non_empty = |id: &&str| !id.is_empty();
    match caller.filter(non_empty).or(payload_user_id.filter(non_empty)) {
        Some(id) => id.to_string(),
        None => {
            tracing::warn!("No authenticated user found. Using request data without user association.");
            ANONYMOUS.to_string()
        }
    }
}

/// Handles a single blood request end to end
///
/// # Stages
/// 1. Validate input
/// 2. Resolve location to coordinates
/// 3. Record the request
/// 4. Match nearby compatible donors
/// 5. Notify matched donors
pub struct RequestHandler {
    resolver: GeoResolver,
    directory: Arc<dyn DonorDirectory>,
    recorder: RequestRecorder,
    matcher: DonorMatcher,
    dispatcher: NotificationDispatcher,
}

impl RequestHandler {
    pub fn new(
        resolver: GeoResolver,
        directory: Arc<dyn DonorDirectory>,
        store: Arc<dyn RequestStore>,
        push: Arc<dyn PushService>,
        matcher: DonorMatcher,
    ) -> Self {
        Self {
            resolver,
            directory,
            recorder: RequestRecorder::new(store),
            matcher,
            dispatcher: NotificationDispatcher::new(push),
        }
    }

    /// Handle a blood request from `caller` (the authenticated user id, if any)
    pub async fn handle(
        &self,
        request: CreateBloodRequest,
        caller: Option<&str>,
    ) -> Result<RequestSummary, RequestError> {
        let result = self.process(request, caller).await;

        if let Err(e) = &result {
            match e {
                RequestError::InvalidArgument(msg) => {
                    tracing::info!("Rejected blood request: {}", msg);
                }
                RequestError::Internal(msg) => {
                    tracing::error!("Error sending notifications: {}", msg);
                }
            }
        }

        result
    }

    async fn process(
        &self,
        request: CreateBloodRequest,
        caller: Option<&str>,
    ) -> Result<RequestSummary, RequestError> {
        let requested_by = resolve_identity(caller, request.user_id.as_deref());
        let data = request.data;

        // Stage 1: validate
        let (blood_group, location, hospital) = match (
            data.blood_group.as_deref(),
            data.location.as_deref(),
            data.hospital.as_deref(),
        ) {
            (Some(group), Some(location), Some(hospital)) if data.missing_fields().is_empty() => {
                (group, location, hospital)
            }
            _ => {
                return Err(RequestError::InvalidArgument(format!(
                    "Missing required fields: {}",
                    data.missing_fields().join(", ")
                )));
            }
        };

        // Stage 2: resolve location
        let location_string = self.resolver.resolve(location).await.ok_or_else(|| {
            RequestError::Internal(format!("Could not resolve location {:?} to coordinates", location))
        })?;

        let origin = location_string
            .parse::<Coordinate>()
            .map_err(|e| RequestError::Internal(format!("Resolved location is invalid: {}", e)))?;

        // Stage 3: record
        let stored = RequestRecorder::build(&data, blood_group, hospital, &location_string, &requested_by);
        let request_id = self.recorder.record(&stored).await?;

        // Stage 4: match
        let matched = self
            .matcher
            .find_donors(self.directory.as_ref(), &origin, blood_group)
            .await?;

        tracing::info!(
            "Matched {} of {} donors within {}km for request {}",
            matched.candidates.len(),
            matched.total_donors,
            self.matcher.max_distance_km(),
            request_id
        );

        // Stage 5: notify
        let report = self
            .dispatcher
            .dispatch(
                &matched.candidates,
                NotificationContext {
                    request_id: &request_id,
                    blood_group,
                    units: data.units.as_ref(),
                    hospital,
                },
            )
            .await;

        Ok(RequestSummary {
            success: true,
            notifications_sent: matched.candidates.len(),
            notifications_failed: report.failed.len(),
            request_id,
        })
    }
}
