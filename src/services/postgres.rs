use crate::models::BloodRequest;
use crate::ports::{RequestStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<PostgresError> for StoreError {
    fn from(e: PostgresError) -> Self {
        StoreError(e.to_string())
    }
}

/// PostgreSQL client backing the blood request store
///
/// Requests are only ever inserted; there is no update or delete path.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert a blood request and return its generated id
    pub async fn insert_request(&self, request: &BloodRequest) -> Result<uuid::Uuid, PostgresError> {
        let id = uuid::Uuid::new_v4();
        let units = request.units.as_ref().map(|u| u.to_string());

        let query = r#"
            INSERT INTO blood_requests (
                id, name, blood_group, units, request_date, request_time, gender,
                hospital, location, phone, requested_by, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#;

        sqlx::query(query)
            .bind(id)
            .bind(&request.name)
            .bind(&request.blood_group)
            .bind(units)
            .bind(&request.date)
            .bind(&request.time)
            .bind(&request.gender)
            .bind(&request.hospital)
            .bind(&request.location)
            .bind(&request.phone)
            .bind(&request.requested_by)
            .bind(request.status.as_str())
            .bind(request.created_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Inserted blood request {} for {}", id, request.requested_by);

        Ok(id)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl RequestStore for PostgresClient {
    async fn append(&self, request: &BloodRequest) -> Result<String, StoreError> {
        let id = self.insert_request(request).await?;
        Ok(id.to_string())
    }
}
