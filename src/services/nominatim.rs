use crate::ports::{GeocodeError, GeocodeHit, Geocoder};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Client identifier sent with every lookup, as the Nominatim usage policy requires
pub const DEFAULT_USER_AGENT: &str = "RhinoRaktDoors/1.0";

/// Errors that can occur when calling Nominatim
#[derive(Debug, Error)]
pub enum NominatimError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding API error: {0}")]
    ApiError(String),
}

impl From<NominatimError> for GeocodeError {
    fn from(e: NominatimError) -> Self {
        GeocodeError(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search client
pub struct NominatimClient {
    endpoint: String,
    user_agent: String,
    client: Client,
}

impl NominatimClient {
    pub fn new(endpoint: String, user_agent: String, timeout: Duration) -> Result<Self, NominatimError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            user_agent,
            client,
        })
    }

    /// Search for an address and return the best match, if any
    pub async fn search(&self, address: &str) -> Result<Option<GeocodeHit>, NominatimError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NominatimError::ApiError(
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            ));
        }

        let places: Vec<Place> = response.json().await?;

        Ok(places.into_iter().next().map(|place| GeocodeHit {
            lat: place.lat,
            lon: place.lon,
        }))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn lookup(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        Ok(self.search(address).await?)
    }
}
