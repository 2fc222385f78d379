//! Rakt Dispatch - blood request matching and donor notification service
//!
//! This library resolves where blood is needed, finds nearby donors whose
//! blood type is compatible and pushes a notification to each of them.

pub mod config;
pub mod core;
pub mod models;
pub mod ports;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, DonorMatcher, GeoResolver, RequestError, RequestHandler};
pub use models::{BloodGroup, BloodRequest, Coordinate, CreateBloodRequest, DonorCandidate, RequestSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let matcher = DonorMatcher::default();
        assert_eq!(matcher.max_distance_km(), 50.0);
        assert!(haversine_distance(12.9716, 77.5946, 12.9716, 77.5946) < 1e-9);
    }
}
