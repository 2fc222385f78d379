use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder, ResponseError};
use crate::core::{RequestError, RequestHandler};
use crate::models::{CreateBloodRequest, ErrorResponse, HealthResponse};
use crate::services::{bearer_token, CallerTokenValidator, PostgresClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
    pub postgres: Option<Arc<PostgresClient>>,
    pub token_validator: Option<CallerTokenValidator>,
}

/// Configure all blood request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/requests", web::post().to(create_request));
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Authenticated caller id from the bearer token, if any
fn authenticated_caller(state: &AppState, http_req: &HttpRequest) -> Option<String> {
    let validator = state.token_validator.as_ref()?;
    let header = http_req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = bearer_token(header)?;

    match validator.caller_id(token) {
        Ok(caller) => Some(caller),
        Err(e) => {
            tracing::warn!("Ignoring caller token: {}", e);
            None
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match &state.postgres {
        Some(pg) => pg.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Create blood request endpoint
///
/// POST /api/v1/requests
///
/// Request body:
/// ```json
/// {
///   "data": {
///     "name": "string",
///     "bloodGroup": "A+",
///     "units": 2,
///     "date": "string",
///     "time": "string",
///     "gender": "string",
///     "hospital": "string",
///     "location": "address or lat,lng",
///     "phone": "string"
///   },
///   "userId": "string"
/// }
/// ```
async fn create_request(
    state: web::Data<AppState>,
    req: web::Json<CreateBloodRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, RequestError> {
    let caller = authenticated_caller(&state, &http_req);

    tracing::info!(
        "Blood request received: bloodGroup={:?}, hospital={:?}",
        req.data.blood_group,
        req.data.hospital
    );

    let summary = state
        .handler
        .handle(req.into_inner(), caller.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}
