// Core algorithm exports
pub mod compatibility;
pub mod dispatcher;
pub mod distance;
pub mod geo;
pub mod handler;
pub mod matcher;
pub mod recorder;

pub use compatibility::{can_donate, compatible_donor_types, compatible_donors};
pub use dispatcher::{DispatchReport, NotificationContext, NotificationDispatcher};
pub use distance::{distance_between, haversine_distance, round_to_one_decimal};
pub use geo::{is_raw_coordinate, GeoResolver};
pub use handler::{RequestError, RequestHandler};
pub use matcher::{DonorMatcher, MatchResult, DEFAULT_MAX_DISTANCE_KM};
pub use recorder::RequestRecorder;
