use crate::models::{Profile, Like};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Page size used when listing whole collections
const LIST_PAGE_SIZE: u32 = 300;

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {0}: {1}")]
    ApiError(StatusCode, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Collection names in the document store
#[derive(Debug, Clone)]
pub struct FirestoreCollections {
    pub users: String,
    pub likes: String,
}

impl Default for FirestoreCollections {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            likes: "likes".to_string(),
        }
    }
}

/// Read-only Firestore REST client
///
/// Handles all communication with the document store including:
/// - Fetching a single profile
/// - Listing all profiles for discovery
/// - Querying like records in both directions
pub struct FirestoreClient {
    documents_url: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
    client: Client,
    collections: FirestoreCollections,
}

impl FirestoreClient {
    /// Create a new client
    ///
    /// `base_url` is the API root, e.g. `https://firestore.googleapis.com/v1`.
    pub fn new(
        base_url: &str,
        project_id: &str,
        database_id: &str,
        collections: FirestoreCollections,
        timeout_secs: u64,
    ) -> Result<Self, FirestoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            base_url.trim_end_matches('/'),
            project_id,
            database_id
        );

        Ok(Self {
            documents_url,
            api_key: None,
            bearer_token: None,
            client,
            collections,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    /// Fetch one profile by uid
    pub async fn get_profile(&self, uid: &str) -> Result<Profile, FirestoreError> {
        let url = format!(
            "{}/{}/{}",
            self.documents_url,
            self.collections.users,
            urlencoding::encode(uid)
        );

        tracing::debug!("Fetching profile for user: {}", uid);

        let response = self.authorize(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FirestoreError::NotFound(format!("Profile not found for user {}", uid)));
        }

        let document: Value = check_status(response).await?.json().await?;
        decode_document(&document)
    }

    /// Fetch every profile in the users collection, in store order
    ///
    /// Documents that don't decode into a profile are skipped.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, FirestoreError> {
        let url = format!("{}/{}", self.documents_url, self.collections.users);
        let mut profiles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .authorize(self.client.get(&url).query(&query))
                .send()
                .await?;
            let page: Value = check_status(response).await?.json().await?;

            if let Some(documents) = page.get("documents").and_then(|d| d.as_array()) {
                for document in documents {
                    match decode_document::<Profile>(document) {
                        Ok(profile) => profiles.push(profile),
                        Err(e) => tracing::warn!("Skipping undecodable profile document: {}", e),
                    }
                }
            }

            let next_token = page
                .get("nextPageToken")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            match next_token {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    tracing::warn!("Document store repeated page token {}, stopping", token);
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Listed {} profiles", profiles.len());

        Ok(profiles)
    }

    /// All like records where `uid` is either side
    pub async fn likes_for(&self, uid: &str) -> Result<Vec<Like>, FirestoreError> {
        let mut likes = self.query_likes("userId", uid).await?;
        likes.extend(self.query_likes("likedUserId", uid).await?);

        tracing::debug!("Found {} like records for {}", likes.len(), uid);

        Ok(likes)
    }

    async fn query_likes(&self, field: &str, uid: &str) -> Result<Vec<Like>, FirestoreError> {
        let url = format!("{}:runQuery", self.documents_url);

        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collections.likes }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": { "stringValue": uid }
                    }
                }
            }
        });

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await?;
        let rows: Value = check_status(response).await?.json().await?;

        let rows = rows
            .as_array()
            .ok_or_else(|| FirestoreError::InvalidResponse("runQuery did not return an array".into()))?;

        let mut likes = Vec::with_capacity(rows.len());

        // Rows without a document only carry a read time
        for document in rows.iter().filter_map(|row| row.get("document")) {
            match decode_document::<Like>(document) {
                Ok(like) => likes.push(like),
                Err(e) => tracing::warn!("Skipping undecodable like document: {}", e),
            }
        }

        Ok(likes)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };

        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FirestoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FirestoreError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Document store returned {}: {}", status, body);

    Err(FirestoreError::ApiError(status, body))
}

/// Decode a Firestore document into `T`
///
/// A missing `uid` field is filled from the document name.
pub fn decode_document<T: DeserializeOwned>(document: &Value) -> Result<T, FirestoreError> {
    let fields = document
        .get("fields")
        .and_then(|f| f.as_object())
        .map(decode_fields)
        .unwrap_or_default();

    let mut data = fields;
    if !data.contains_key("uid") {
        if let Some(id) = document
            .get("name")
            .and_then(|n| n.as_str())
            .and_then(|n| n.rsplit('/').next())
        {
            data.insert("uid".to_string(), Value::String(id.to_string()));
        }
    }

    serde_json::from_value(Value::Object(data))
        .map_err(|e| FirestoreError::InvalidResponse(format!("Failed to parse document: {}", e)))
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), decode_value(value)))
        .collect()
}

/// Convert a Firestore typed value into plain JSON
pub fn decode_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };

    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        // Integers travel as strings
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        // NaN and the infinities travel as strings
        "doubleValue" => match inner.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
            Some(f) => Value::from(f),
            None => Value::Null,
        },
        "stringValue" | "booleanValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(|f| f.as_object())
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}
