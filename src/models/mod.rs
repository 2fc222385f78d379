// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AndroidConfig, AndroidNotification, BloodGroup, BloodRequest, Coordinate, CoordinateError,
    DonorAction, DonorCandidate, DonorRecord, NotificationVisibility, PushMessage,
    PushNotification, RequestStatus, UnknownBloodGroup, Units,
};
pub use requests::{BloodRequestData, CreateBloodRequest};
pub use responses::{ErrorResponse, HealthResponse, RequestSummary};
