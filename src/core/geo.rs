use crate::ports::Geocoder;
use crate::services::GeocodeCache;
use regex::Regex;
use std::sync::{Arc, OnceLock};

static RAW_COORDINATE: OnceLock<Regex> = OnceLock::new();

fn raw_coordinate_pattern() -> &'static Regex {
    RAW_COORDINATE.get_or_init(|| {
        Regex::new(r"^-?\d+(\.\d+)?,-?\d+(\.\d+)?$").expect("raw coordinate pattern is valid")
    })
}

/// Whether `input` is already a "lat,lng" pair that needs no geocoding
#[inline]
pub fn is_raw_coordinate(input: &str) -> bool {
    raw_coordinate_pattern().is_match(input)
}

/// Turns caller-supplied locations into canonical "lat,lng" strings
#[derive(Clone)]
pub struct GeoResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Option<GeocodeCache>,
}

impl GeoResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: GeocodeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve a location to "lat,lng"
    ///
    /// Raw coordinates are returned unchanged without a lookup. Addresses go
    /// through the geocoder; no match or any lookup failure yields `None`.
    pub async fn resolve(&self, location: &str) -> Option<String> {
        if is_raw_coordinate(location) {
            return Some(location.to_string());
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(location).await {
                return Some(hit);
            }
        }

        match self.geocoder.lookup(location).await {
            Ok(Some(hit)) => {
                let resolved = format!("{},{}", hit.lat, hit.lon);
                tracing::debug!("Geocoded {:?} to {}", location, resolved);
                if let Some(cache) = &self.cache {
                    cache.insert(location, resolved.clone()).await;
                }
                Some(resolved)
            }
            Ok(None) => {
                tracing::error!("No geocoding results found for {:?}", location);
                None
            }
            Err(e) => {
                tracing::error!("Failed to geocode {:?}: {}", location, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{GeocodeError, GeocodeHit};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGeocoder {
        result: Result<Option<GeocodeHit>, String>,
        calls: AtomicUsize,
    }

    impl StubGeocoder {
        fn new(result: Result<Option<GeocodeHit>, String>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn lookup(&self, _address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(GeocodeError)
        }
    }

    fn hit(lat: &str, lon: &str) -> GeocodeHit {
        GeocodeHit {
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn test_raw_coordinate_pattern() {
        assert!(is_raw_coordinate("12.9716,77.5946"));
        assert!(is_raw_coordinate("-33,151"));
        assert!(is_raw_coordinate("-33.8688,-151.2093"));
        assert!(!is_raw_coordinate("12.9716, 77.5946"));
        assert!(!is_raw_coordinate("+12.9,77.5"));
        assert!(!is_raw_coordinate("12.,77"));
        assert!(!is_raw_coordinate("MG Road, Bengaluru"));
        assert!(!is_raw_coordinate(""));
    }

    #[tokio::test]
    async fn test_raw_coordinates_skip_lookup() {
        let geocoder = StubGeocoder::new(Ok(Some(hit("0", "0"))));
        let resolver = GeoResolver::new(geocoder.clone());

        let resolved = resolver.resolve("12.9716,77.5946").await;

        assert_eq!(resolved.as_deref(), Some("12.9716,77.5946"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_address_uses_first_result() {
        let geocoder = StubGeocoder::new(Ok(Some(hit("12.9756", "77.6050"))));
        let resolver = GeoResolver::new(geocoder.clone());

        let resolved = resolver.resolve("MG Road, Bengaluru").await;

        assert_eq!(resolved.as_deref(), Some("12.9756,77.6050"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_results_is_absent() {
        let resolver = GeoResolver::new(StubGeocoder::new(Ok(None)));
        assert_eq!(resolver.resolve("Nowhere Street").await, None);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_absent() {
        let resolver = GeoResolver::new(StubGeocoder::new(Err("503".to_string())));
        assert_eq!(resolver.resolve("Anna Salai, Chennai").await, None);
    }

    #[tokio::test]
    async fn test_cache_avoids_repeat_lookups() {
        let geocoder = StubGeocoder::new(Ok(Some(hit("13.0604", "80.2496"))));
        let resolver = GeoResolver::new(geocoder.clone()).with_cache(GeocodeCache::new(10, 60));

        let first = resolver.resolve("Anna Salai, Chennai").await;
        let second = resolver.resolve("Anna Salai, Chennai").await;

        assert_eq!(first, second);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
