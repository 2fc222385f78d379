use crate::models::DonorRecord;
use crate::ports::{DirectoryError, DonorDirectory};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<AppwriteError> for DirectoryError {
    fn from(e: AppwriteError) -> Self {
        DirectoryError(e.to_string())
    }
}

/// Appwrite API client
///
/// Reads the users collection, which doubles as the donor directory.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    users_collection: String,
    page_size: usize,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        users_collection: String,
        page_size: usize,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            users_collection,
            page_size: page_size.max(1),
            client,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.users_collection
        )
    }

    /// Fetch one page of donor documents
    ///
    /// Returns the parsed records, the raw document count of the page and the
    /// collection-wide total reported by Appwrite.
    async fn fetch_page(&self, offset: usize) -> Result<(Vec<DonorRecord>, usize, u64), AppwriteError> {
        let queries = [
            "equal(\"isDonor\", [true])".to_string(),
            format!("limit({})", self.page_size),
            format!("offset({})", offset),
        ];

        let query_string = queries
            .iter()
            .map(|q| format!("queries%5B%5D={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.documents_url(), query_string);

        tracing::debug!("Fetching donors from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to query donors: {} - {}", status, body);
            return Err(AppwriteError::ApiError(format!("Failed to query donors: {}", status)));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let records = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value::<DonorRecord>(doc.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!("Skipping malformed donor document: {}", e);
                    None
                }
            })
            .collect();

        Ok((records, documents.len(), total))
    }

    /// Read every document flagged as a donor, page by page
    pub async fn list_donors(&self) -> Result<Vec<DonorRecord>, AppwriteError> {
        let mut donors = Vec::new();
        let mut offset = 0;

        loop {
            let (records, page_len, total) = self.fetch_page(offset).await?;
            donors.extend(records);
            offset += page_len;

            if page_len < self.page_size || offset as u64 >= total {
                break;
            }
        }

        tracing::debug!("Queried {} donors", donors.len());

        Ok(donors)
    }
}

#[async_trait]
impl DonorDirectory for AppwriteClient {
    async fn active_donors(&self) -> Result<Vec<DonorRecord>, DirectoryError> {
        Ok(self.list_donors().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(base_url: String, page_size: usize) -> AppwriteClient {
        AppwriteClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            "users".to_string(),
            page_size,
        )
        .unwrap()
    }

    #[test]
    fn test_appwrite_client_creation() {
        let client = client("https://appwrite.test/v1/".to_string(), 0);

        assert_eq!(client.documents_url(), "https://appwrite.test/v1/databases/test_db/collections/users/documents");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.page_size, 1);
    }

    #[tokio::test]
    async fn test_list_donors_pages_through_collection() {
        let mut server = mockito::Server::new_async().await;
        let path = "/databases/test_db/collections/users/documents";

        let first = server
            .mock("GET", path)
            .match_header("x-appwrite-key", "test_key")
            .match_header("x-appwrite-project", "test_project")
            // queries[] repeats, so match the encoded parts of the raw query string
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex(r"equal%28%22isDonor%22%2C%20%5Btrue%5D%29".into()),
                Matcher::Regex(r"limit%282%29".into()),
                Matcher::Regex(r"offset%280%29".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 3, "documents": [
                    {"$id": "u1", "bloodType": "O-", "location": "12.97,77.59", "fcmToken": "tok1"},
                    {"$id": "u2", "bloodType": "A+", "location": 42}
                ]}"#,
            )
            .create_async()
            .await;

        let second = server
            .mock("GET", path)
            .match_query(Matcher::AllOf(vec![
                Matcher::Regex(r"isDonor".into()),
                Matcher::Regex(r"offset%282%29".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 3, "documents": [{"$id": "u3", "bloodType": "B+"}]}"#)
            .create_async()
            .await;

        let donors = client(server.url(), 2).active_donors().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;

        // u2 has a non-string location and is skipped
        let ids: Vec<_> = donors.iter().map(|d| d.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);
        assert_eq!(donors[0].push_token(), Some("tok1"));
        assert_eq!(donors[1].location(), None);
    }

    #[tokio::test]
    async fn test_single_short_page_stops_paging() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/test_db/collections/users/documents")
            .match_query(Matcher::Regex(r"offset%280%29".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total": 1, "documents": [{"$id": "u1", "bloodType": "O+"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let donors = client(server.url(), 100).list_donors().await.unwrap();

        mock.assert_async().await;
        assert_eq!(donors.len(), 1);
    }

    #[tokio::test]
    async fn test_list_donors_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client(server.url(), 100).list_donors().await.unwrap_err();
        assert!(matches!(err, AppwriteError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = client(server.url(), 100).list_donors().await.unwrap_err();
        assert!(matches!(err, AppwriteError::Unauthorized));
    }
}
