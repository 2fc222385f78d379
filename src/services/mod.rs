// Service exports
pub mod appwrite;
pub mod auth;
pub mod cache;
pub mod fcm;
pub mod google_auth;
pub mod nominatim;
pub mod postgres;

pub use appwrite::{AppwriteClient, AppwriteError};
pub use auth::{bearer_token, CallerTokenValidator, TokenError};
pub use cache::{CacheKey, GeocodeCache};
pub use fcm::{FcmClient, FcmError};
pub use google_auth::{FcmCredentials, GoogleAuthError, ServiceAccountKey};
pub use nominatim::{NominatimClient, NominatimError, DEFAULT_USER_AGENT};
pub use postgres::{PostgresClient, PostgresError};
