//! Cosmos DB Document Client
//!
//! A thin read-only wrapper over the Cosmos DB REST list/query surface,
//! authenticated with the session's bearer token.

#![warn(clippy::all, rust_2018_idioms)]

use std::sync::{Arc, Mutex};

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::app::cosmos_identity::{AccessError, CosmosIdentity};

use super::types::{Document, DocumentPage, PageOptions};

/// REST API version sent with every request
const COSMOS_API_VERSION: &str = "2018-12-31";

/// Read-only document client for the active session.
///
/// Only listing and paging operations exist here. The absence of any
/// create/update/delete call is a deliberate constraint so this tool can be
/// pointed at production accounts without risk of mutating them.
#[derive(Clone)]
pub struct DocumentClient {
    identity: Arc<Mutex<CosmosIdentity>>,
    http: reqwest::Client,
}

impl DocumentClient {
    pub fn new(identity: Arc<Mutex<CosmosIdentity>>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { identity, http }
    }

    /// List database names for the account.
    pub async fn list_databases(&self) -> Result<Vec<String>, AccessError> {
        let (endpoint, auth) = self.session_parameters()?;
        let url = format!("{}/dbs", endpoint);

        let body = self.get_json(&url, &auth, &[]).await?;
        Ok(collect_ids(&body, "Databases"))
    }

    /// List container names within a database.
    pub async fn list_containers(&self, database: &str) -> Result<Vec<String>, AccessError> {
        let (endpoint, auth) = self.session_parameters()?;
        let url = format!("{}/dbs/{}/colls", endpoint, encode_segment(database));

        let body = self.get_json(&url, &auth, &[]).await?;
        Ok(collect_ids(&body, "DocumentCollections"))
    }

    /// Fetch one page of documents from a container.
    ///
    /// Pass the previous page's continuation token to continue; an absent
    /// token in the returned page means pagination is exhausted.
    pub async fn fetch_page(
        &self,
        database: &str,
        container: &str,
        options: PageOptions,
    ) -> Result<DocumentPage, AccessError> {
        let (endpoint, auth) = self.session_parameters()?;
        let url = format!(
            "{}/dbs/{}/colls/{}/docs",
            endpoint,
            encode_segment(database),
            encode_segment(container)
        );

        let mut extra_headers = vec![(
            "x-ms-max-item-count",
            options.max_item_count.to_string(),
        )];
        if let Some(continuation) = &options.continuation {
            extra_headers.push(("x-ms-continuation", continuation.clone()));
        }

        let response = self.send_get(&url, &auth, &extra_headers).await?;
        let continuation = header_value(response.headers(), "x-ms-continuation");

        let body: Value = response
            .json()
            .await
            .map_err(|e| AccessError::Connectivity(format!("malformed response: {}", e)))?;

        let documents: Vec<Document> = body
            .get("Documents")
            .and_then(|d| d.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            "Fetched {} documents from {}/{} (more: {})",
            documents.len(),
            database,
            container,
            continuation.is_some()
        );

        Ok(DocumentPage::new(documents, continuation))
    }

    /// Snapshot the endpoint and authorization header for one request.
    fn session_parameters(&self) -> Result<(String, String), AccessError> {
        let identity = self
            .identity
            .lock()
            .map_err(|_| AccessError::Connectivity("session state poisoned".to_string()))?;
        let token = identity.bearer_token()?;
        Ok((identity.endpoint(), aad_authorization_header(&token)))
    }

    async fn get_json(
        &self,
        url: &str,
        auth: &str,
        extra_headers: &[(&str, String)],
    ) -> Result<Value, AccessError> {
        let response = self.send_get(url, auth, extra_headers).await?;
        response
            .json()
            .await
            .map_err(|e| AccessError::Connectivity(format!("malformed response: {}", e)))
    }

    async fn send_get(
        &self,
        url: &str,
        auth: &str,
        extra_headers: &[(&str, String)],
    ) -> Result<reqwest::Response, AccessError> {
        let mut request = self
            .http
            .get(url)
            .header("Authorization", auth)
            .header("x-ms-version", COSMOS_API_VERSION)
            .header("x-ms-date", rfc1123_now());

        for (name, value) in extra_headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AccessError::Connectivity(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, &body))
        }
    }
}

/// Map a non-success HTTP status onto the access error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> AccessError {
    let detail: String = body.chars().take(200).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AccessError::Auth(format!(
            "request rejected ({}): {}",
            status, detail
        )),
        StatusCode::NOT_FOUND => {
            AccessError::NotFound("the database or container no longer exists".to_string())
        }
        _ => AccessError::Connectivity(format!("service returned {}: {}", status, detail)),
    }
}

/// AAD bearer authorization header value, URL-encoded as the service expects.
fn aad_authorization_header(token: &str) -> String {
    let raw = format!("type=aad&ver=1.0&sig={}", token);
    utf8_percent_encode(&raw, NON_ALPHANUMERIC).to_string()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn rfc1123_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Extract the `id` of each entry in a list response, e.g.
/// `{"Databases": [{"id": "..."}], "_count": 2}`.
fn collect_ids(body: &Value, key: &str) -> Vec<String> {
    body.get(key)
        .and_then(|entries| entries.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(|id| id.as_str()))
                .map(|id| id.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aad_authorization_header_is_encoded() {
        let header = aad_authorization_header("abc.def-123");
        // '=' and '&' must be escaped; the token's own punctuation too
        assert!(header.starts_with("type%3Daad%26ver%3D1%2E0%26sig%3D"));
        assert!(!header.contains('='));
        assert!(!header.contains('&'));
    }

    #[test]
    fn test_encode_segment_escapes_separators() {
        assert_eq!(encode_segment("plain"), "plain");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_collect_ids() {
        let body = json!({
            "_rid": "",
            "Databases": [{"id": "orders"}, {"id": "billing"}, {"noid": true}],
            "_count": 2
        });
        assert_eq!(collect_ids(&body, "Databases"), vec!["orders", "billing"]);
        assert!(collect_ids(&body, "DocumentCollections").is_empty());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "denied"),
            AccessError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, ""),
            AccessError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, ""),
            AccessError::Connectivity(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AccessError::Connectivity(_)
        ));
    }
}
