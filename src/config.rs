use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub database: DatabaseSettings,
    pub fcm: FcmSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub users: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmSettings {
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    pub project_id: String,
    /// Service account JSON key used to mint access tokens
    pub service_account_path: Option<String>,
    /// Pre-issued OAuth2 access token; Google expires these after about an hour
    pub access_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret for caller tokens; unset means every caller is unauthenticated
    pub jwt_secret: Option<String>,
}

fn default_page_size() -> usize { 100 }
fn default_fcm_endpoint() -> String { "https://fcm.googleapis.com".to_string() }
fn default_geocoding_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { crate::services::DEFAULT_USER_AGENT.to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_cache_size() -> u64 { 1000 }
fn default_cache_ttl_secs() -> u64 { 86_400 }
fn default_max_distance_km() -> f64 { crate::core::DEFAULT_MAX_DISTANCE_KM }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with RAKT_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with RAKT_)
            // e.g., RAKT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RAKT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RAKT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known unprefixed environment variables on top of the config
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(key_path) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        builder = builder.set_override("fcm.service_account_path", key_path)?;
    }
    if let Ok(access_token) = env::var("FCM_ACCESS_TOKEN") {
        builder = builder.set_override("fcm.access_token", access_token)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geocoding() {
        let geocoding = GeocodingSettings::default();
        assert_eq!(geocoding.endpoint, "https://nominatim.openstreetmap.org");
        assert_eq!(geocoding.user_agent, "RhinoRaktDoors/1.0");
        assert_eq!(geocoding.cache_ttl_secs, 86_400);
    }

    #[test]
    fn test_default_matching() {
        assert_eq!(MatchingSettings::default().max_distance_km, 50.0);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rakt-settings-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [appwrite]
            endpoint = "https://appwrite.test/v1"
            api_key = "key"
            project_id = "project"
            database_id = "db"

            [collection]
            users = "users"

            [database]
            url = "postgres://localhost/rakt"

            [fcm]
            project_id = "rakt"
            access_token = "token"

            [matching]
            max_distance_km = 25.0
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.appwrite.page_size, 100);
        assert_eq!(settings.fcm.endpoint, "https://fcm.googleapis.com");
        assert_eq!(settings.matching.max_distance_km, 25.0);
        assert_eq!(settings.geocoding.user_agent, "RhinoRaktDoors/1.0");
        assert!(settings.auth.jwt_secret.is_none());
        assert_eq!(settings.fcm.access_token.as_deref(), Some("token"));
        assert!(settings.fcm.service_account_path.is_none());
    }
}
