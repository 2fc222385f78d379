use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown blood group: {0}")]
pub struct UnknownBloodGroup(pub String);

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .iter()
            .copied()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| UnknownBloodGroup(s.to_string()))
    }
}

/// Lifecycle state of a stored blood request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Active,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Active => "active",
        }
    }
}

/// Requested quantity as the caller sent it, either a JSON number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Units {
    Count(serde_json::Number),
    Text(String),
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Count(n) => write!(f, "{}", n),
            Units::Text(s) => f.write_str(s),
        }
    }
}

/// Normalized blood request as written to the request store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequest {
    pub name: Option<String>,
    /// Group exactly as requested; unknown groups are stored and match nobody
    #[serde(rename = "bloodGroup")]
    pub blood_group: String,
    pub units: Option<Units>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub gender: Option<String>,
    pub hospital: String,
    /// Canonical "lat,lng" string
    pub location: String,
    pub phone: Option<String>,
    #[serde(rename = "requestedBy")]
    pub requested_by: String,
    pub status: RequestStatus,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Donor entry as read from the user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorRecord {
    #[serde(rename = "$id", alias = "userId")]
    pub user_id: String,
    #[serde(rename = "fcmToken", default)]
    pub fcm_token: Option<String>,
    #[serde(rename = "bloodType", default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl DonorRecord {
    /// Push token, treating an empty string as absent
    pub fn push_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Location string, treating an empty string as absent
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }
}

/// Donor selected for notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "fcmToken")]
    pub fcm_token: String,
    /// Kilometres, rounded to one decimal place
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("Expected \"lat,lng\", got {0:?}")]
    Format(String),

    #[error("Coordinate component is not a finite number: {0:?}")]
    NotFinite(String),
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let (lat, lng) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => (lat, lng),
            _ => return Err(CoordinateError::Format(s.to_string())),
        };

        let parse = |part: &str| -> Result<f64, CoordinateError> {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CoordinateError::NotFinite(part.to_string()))
        };

        Ok(Self {
            lat: parse(lat)?,
            lng: parse(lng)?,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Outbound push message for a single device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub notification: PushNotification,
    /// Flat string map delivered to the app alongside the notification
    pub data: BTreeMap<String, String>,
    pub android: AndroidConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidNotification {
    pub click_action: String,
    pub default_sound: bool,
    pub default_vibrate_timings: bool,
    pub notification_count: u32,
    pub visibility: NotificationVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationVisibility {
    Public,
}

/// Action button offered to the donor in the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorAction {
    pub action: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_round_trip_through_str() {
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>(), Ok(group));
        }
        assert!("C+".parse::<BloodGroup>().is_err());
        assert!("a+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_blood_group_serde_uses_wire_names() {
        let json = serde_json::to_string(&BloodGroup::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
        let parsed: BloodGroup = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(parsed, BloodGroup::OPositive);
    }

    #[test]
    fn test_units_accepts_numbers_and_strings() {
        let units: Vec<Units> = serde_json::from_str(r#"[2, 2.5, "2", "two bags"]"#).unwrap();
        let shown: Vec<String> = units.iter().map(Units::to_string).collect();
        assert_eq!(shown, vec!["2", "2.5", "2", "two bags"]);
        assert!(serde_json::from_str::<Units>("true").is_err());
    }

    #[test]
    fn test_coordinate_parse() {
        let c: Coordinate = "12.9716,77.5946".parse().unwrap();
        assert_eq!(c, Coordinate::new(12.9716, 77.5946));

        let spaced: Coordinate = "-33.86, 151.2".parse().unwrap();
        assert_eq!(spaced, Coordinate::new(-33.86, 151.2));
    }

    #[test]
    fn test_coordinate_parse_rejects_malformed() {
        assert!(matches!("12.9".parse::<Coordinate>(), Err(CoordinateError::Format(_))));
        assert!(matches!("1,2,3".parse::<Coordinate>(), Err(CoordinateError::Format(_))));
        assert!(matches!("abc,77.5".parse::<Coordinate>(), Err(CoordinateError::NotFinite(_))));
        assert!(matches!("NaN,1".parse::<Coordinate>(), Err(CoordinateError::NotFinite(_))));
        assert!(matches!("inf,1".parse::<Coordinate>(), Err(CoordinateError::NotFinite(_))));
    }

    #[test]
    fn test_donor_record_from_appwrite_document() {
        let doc = serde_json::json!({
            "$id": "user-1",
            "isDonor": true,
            "bloodType": "O-",
            "location": "12.97,77.59",
            "fcmToken": ""
        });
        let record: DonorRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.push_token(), None);
        assert_eq!(record.location(), Some("12.97,77.59"));
    }

    #[test]
    fn test_android_notification_wire_format() {
        let n = AndroidNotification {
            click_action: "FLUTTER_NOTIFICATION_CLICK".to_string(),
            default_sound: true,
            default_vibrate_timings: true,
            notification_count: 0,
            visibility: NotificationVisibility::Public,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["visibility"], "PUBLIC");
        assert_eq!(json["defaultSound"], true);
        assert_eq!(json["clickAction"], "FLUTTER_NOTIFICATION_CLICK");
    }
}
