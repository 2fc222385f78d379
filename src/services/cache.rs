use std::time::Duration;

/// In-memory cache of resolved addresses
///
/// Nominatim's usage policy forbids heavy repeated querying, so identical
/// addresses inside the TTL window are answered locally. Only successful
/// lookups are stored.
#[derive(Clone)]
pub struct GeocodeCache {
    entries: moka::future::Cache<String, String>,
}

impl GeocodeCache {
    /// Create a new cache holding at most `capacity` addresses for `ttl_secs`
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    /// Get a previously resolved "lat,lng" string
    pub async fn get(&self, address: &str) -> Option<String> {
        let key = CacheKey::geocode(address);
        let hit = self.entries.get(&key).await;
        if hit.is_some() {
            tracing::trace!("Geocode cache hit: {}", key);
        } else {
            tracing::trace!("Geocode cache miss: {}", key);
        }
        hit
    }

    /// Store a resolved "lat,lng" string
    pub async fn insert(&self, address: &str, location: String) {
        let key = CacheKey::geocode(address);
        tracing::trace!("Geocode cache set: {}", key);
        self.entries.insert(key, location).await;
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for an address, ignoring case and surrounding whitespace
    pub fn geocode(address: &str) -> String {
        format!("geocode:{}", address.trim().to_lowercase())
    }
}
