use crate::core::{
    compatibility::{can_donate, compatible_donor_types},
    distance::{distance_between, round_to_one_decimal},
};
use crate::models::{Coordinate, DonorCandidate, DonorRecord};
use crate::ports::{DirectoryError, DonorDirectory};

/// Default search radius around the request location
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub candidates: Vec<DonorCandidate>,
    pub total_donors: usize,
}

/// Selects donors who can give to a request and are close enough to reach it
///
/// # Pipeline Stages
/// 1. Push token present
/// 2. Blood type compatible with the requested group
/// 3. Location present and parseable
/// 4. Great-circle distance within the threshold
///
/// Candidates keep directory order.
#[derive(Debug, Clone, Copy)]
pub struct DonorMatcher {
    max_distance_km: f64,
}

impl DonorMatcher {
    pub fn new(max_distance_km: f64) -> Self {
        Self { max_distance_km }
    }

    pub fn with_default_distance() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM)
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km
    }

    /// Fetch active donors from the directory and filter them
    pub async fn find_donors(
        &self,
        directory: &dyn DonorDirectory,
        origin: &Coordinate,
        blood_group: &str,
    ) -> Result<MatchResult, DirectoryError> {
        let donors = directory.active_donors().await?;
        tracing::debug!("Fetched {} active donors", donors.len());
        Ok(self.filter(origin, blood_group, donors))
    }

    /// Filter directory records down to notifiable candidates
    pub fn filter(
        &self,
        origin: &Coordinate,
        blood_group: &str,
        donors: Vec<DonorRecord>,
    ) -> MatchResult {
        let total_donors = donors.len();

        if compatible_donor_types(blood_group).is_empty() {
            tracing::warn!("Unknown blood group {:?}, no donor can match", blood_group);
        }

        let candidates = donors
            .into_iter()
            .filter_map(|donor| self.evaluate(origin, blood_group, donor))
            .collect();

        MatchResult {
            candidates,
            total_donors,
        }
    }

    fn evaluate(
        &self,
        origin: &Coordinate,
        blood_group: &str,
        donor: DonorRecord,
    ) -> Option<DonorCandidate> {
        let token = donor.push_token()?;

        let blood_type = donor.blood_type.as_deref()?;
        if !can_donate(blood_type, blood_group) {
            return None;
        }

        tracing::info!("Eligible donor: {} ({})", donor.user_id, blood_type);

        let location = donor.location()?;
        let donor_location: Coordinate = match location.parse() {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Skipping donor {} with bad location: {}", donor.user_id, e);
                return None;
            }
        };

        let distance_km = distance_between(origin, &donor_location);
        tracing::debug!("Donor {} is {:.3} km away", donor.user_id, distance_km);

        if distance_km > self.max_distance_km {
            return None;
        }

        Some(DonorCandidate {
            fcm_token: token.to_string(),
            user_id: donor.user_id,
            distance_km: round_to_one_decimal(distance_km),
        })
    }
}

impl Default for DonorMatcher {
    fn default() -> Self {
        Self::with_default_distance()
    }
}
