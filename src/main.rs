use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use rakt_dispatch::config::Settings;
use rakt_dispatch::core::{DonorMatcher, GeoResolver, RequestHandler};
use rakt_dispatch::routes::{self, requests::AppState};
use rakt_dispatch::services::{
    AppwriteClient, CallerTokenValidator, FcmClient, FcmCredentials, GeocodeCache, NominatimClient,
    PostgresClient, ServiceAccountKey,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid-argument".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error<E: std::fmt::Display>(what: &str, e: E) -> std::io::Error {
    error!("{}: {}", what, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Rakt Dispatch service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Donor directory
    let appwrite = Arc::new(
        AppwriteClient::new(
            settings.appwrite.endpoint.clone(),
            settings.appwrite.api_key.clone(),
            settings.appwrite.project_id.clone(),
            settings.appwrite.database_id.clone(),
            settings.collection.users.clone(),
            settings.appwrite.page_size,
        )
        .map_err(|e| startup_error("Failed to create Appwrite client", e))?,
    );

    info!("Appwrite client initialized");

    // Request store
    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized");

    // Push delivery
    let credentials = match (&settings.fcm.service_account_path, &settings.fcm.access_token) {
        (Some(path), _) => ServiceAccountKey::from_file(path)
            .and_then(FcmCredentials::service_account)
            .map_err(|e| startup_error("Failed to load FCM service account", e))?,
        (None, Some(token)) if !token.is_empty() => {
            warn!("Using a fixed FCM access token, sends will fail once it expires");
            FcmCredentials::Static(token.clone())
        }
        _ => {
            return Err(startup_error(
                "Missing FCM credentials",
                "set fcm.service_account_path or fcm.access_token",
            ))
        }
    };

    let fcm = Arc::new(
        FcmClient::new(
            settings.fcm.endpoint.clone(),
            settings.fcm.project_id.clone(),
            credentials,
            Duration::from_secs(settings.fcm.timeout_secs),
        )
        .map_err(|e| startup_error("Failed to create FCM client", e))?,
    );

    info!("FCM client initialized for project {}", settings.fcm.project_id);

    // Geocoding
    let nominatim = Arc::new(
        NominatimClient::new(
            settings.geocoding.endpoint.clone(),
            settings.geocoding.user_agent.clone(),
            Duration::from_secs(settings.geocoding.timeout_secs),
        )
        .map_err(|e| startup_error("Failed to create geocoding client", e))?,
    );
    let geocode_cache = GeocodeCache::new(settings.geocoding.cache_size, settings.geocoding.cache_ttl_secs);
    let resolver = GeoResolver::new(nominatim).with_cache(geocode_cache);

    info!(
        "Geocoder initialized (cache: {} entries, TTL: {}s)",
        settings.geocoding.cache_size, settings.geocoding.cache_ttl_secs
    );

    let matcher = DonorMatcher::new(settings.matching.max_distance_km);

    info!("Matcher initialized with max distance {}km", matcher.max_distance_km());

    let token_validator = match &settings.auth.jwt_secret {
        Some(secret) => Some(CallerTokenValidator::new(secret.as_bytes())),
        None => {
            warn!("No JWT secret configured, all callers are treated as unauthenticated");
            None
        }
    };

    let handler = Arc::new(RequestHandler::new(
        resolver,
        appwrite,
        postgres.clone(),
        fcm,
        matcher,
    ));

    // Build application state
    let app_state = AppState {
        handler,
        postgres: Some(postgres),
        token_validator,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
