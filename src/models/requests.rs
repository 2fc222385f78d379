use super::domain::Units;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Required fields as (wire name, field name), in reporting order
const REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("bloodGroup", "blood_group"),
    ("location", "location"),
    ("hospital", "hospital"),
];

/// Request fields supplied by the caller
///
/// Every field is optional on the wire so that missing required fields can be
/// reported together instead of failing deserialization on the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BloodRequestData {
    #[serde(default)]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(rename = "bloodGroup", default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub units: Option<Units>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub hospital: Option<String>,
    /// Free-form address or a raw "lat,lng" pair
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl BloodRequestData {
    /// Wire names of required fields that are absent or empty, in a stable order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let errors = match self.validate() {
            Ok(()) => return Vec::new(),
            Err(errors) => errors,
        };
        let failed = errors.field_errors();

        // Error keys may carry either the serde rename or the field name
        REQUIRED_FIELDS
            .iter()
            .filter(|(wire, field)| failed.contains_key(*wire) || failed.contains_key(*field))
            .map(|(wire, _)| *wire)
            .collect()
    }
}

/// Inbound blood request payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBloodRequest {
    #[serde(default)]
    pub data: BloodRequestData,
    /// Identity fallback used when the caller is not authenticated
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}
