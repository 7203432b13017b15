//! PocketBase record store client
//!
//! Provides a typed HTTP client for the PocketBase REST API. Handles the
//! authentication token, JSON (de)serialization, and endpoint construction.
//! Collection names and record ids are appended as percent-encoded path
//! segments, so an id such as `a/b` never escapes its segment.
//!
//! ## Authentication state
//!
//! A client starts unauthenticated. One successful [`StoreClient::authenticate`]
//! call stores a bearer token; there is no way back short of building a new
//! client. Record operations on an unauthenticated client fail immediately
//! without touching the network.
//!
//! ## Failure contract
//!
//! Each record primitive comes in two forms:
//! - `try_*` returns `Result<_, StoreError>`
//! - the plain form logs the error and returns a sentinel (`None` / `false`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pbaudit_store::StoreClient;
//!
//! # async fn example() {
//! let mut client = StoreClient::new("http://localhost:8090");
//! if client.authenticate("auditor@example.com", "secret").await {
//!     let page = client.list_records("audits", &Default::default()).await;
//!     println!("{:?}", page.map(|p| p.total_items));
//! }
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::StoreError;

/// Path segments of the password authentication endpoint
const AUTH_SEGMENTS: [&str; 4] = ["api", "collections", "users", "auth-with-password"];

/// Default page size for record listings
pub const DEFAULT_PER_PAGE: u32 = 50;

// ============================================================================
// Store API types
// ============================================================================

/// Body of the password authentication request
#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

/// Response from the password authentication endpoint
#[derive(Debug, Deserialize)]
struct AuthResponse {
    /// Bearer token for subsequent requests
    token: Option<String>,
}

/// Error body returned by PocketBase on failed requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// A record as returned by the store
///
/// System fields are typed; collection-specific fields are kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    /// Store-assigned identifier
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Collection-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StoreRecord {
    /// Returns a collection-specific field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// One page of a record listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub page: u32,
    pub per_page: u32,
    /// Total matching records (`-1` when the store skipped counting)
    pub total_items: i64,
    pub total_pages: i64,
    pub items: Vec<StoreRecord>,
}

/// Filtering, sorting and pagination for [`StoreClient::list_records`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// PocketBase filter expression, e.g. `account = "A1"`
    pub filter: Option<String>,
    /// Sort expression, e.g. `-date,+account`
    pub sort: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Query-string pairs; empty filter and sort expressions are omitted
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            params.push(("filter", filter.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sort", sort.to_string()));
        }
        params
    }
}

// ============================================================================
// StoreClient
// ============================================================================

/// HTTP client for a PocketBase record store
///
/// Wraps `reqwest::Client` with the base URL and, once authenticated, the
/// bearer token.
pub struct StoreClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Bearer token; `Some` exactly when authenticated
    token: Option<String>,
}

impl StoreClient {
    /// Creates an unauthenticated client for the store at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true once [`authenticate`](Self::authenticate) has succeeded
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the current bearer token, if authenticated
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Builds an endpoint URL by appending `segments` to the base URL.
    ///
    /// Each segment is percent-encoded on its own; `/`, `?` and `#` inside a
    /// segment cannot change the path structure.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a request builder for the given method and URL
    ///
    /// When authenticated, adds the `Authorization: Bearer` header.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn records_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.endpoint(&["api", "collections", collection, "records"])
    }

    fn record_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        if matches!(id, "" | "." | "..") {
            return Err(StoreError::InvalidUrl(format!("record id {:?}", id)));
        }
        self.endpoint(&["api", "collections", collection, "records", id])
    }

    fn require_auth(&self) -> Result<(), StoreError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(StoreError::NotAuthenticated)
        }
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Authenticates with identity and password, storing the bearer token.
    ///
    /// Only an HTTP 200 carrying a non-empty token counts as success; on any
    /// failure the authentication state is left unchanged.
    pub async fn try_authenticate(
        &mut self,
        identity: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&AUTH_SEGMENTS)?;
        debug!(url = %url, "Attempting to authenticate");

        let response = self
            .client
            .post(url)
            .json(&AuthRequest { identity, password })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(error_from_response(response).await);
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("auth response: {}", e)))?;

        match body.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.token = Some(token);
                info!("Authentication successful");
                Ok(())
            }
            None => Err(StoreError::InvalidResponse(
                "auth response carried no token".to_string(),
            )),
        }
    }

    /// Authenticates, returning `false` (and logging) on any failure
    pub async fn authenticate(&mut self, identity: &str, password: &str) -> bool {
        match self.try_authenticate(identity, password).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Authentication failed");
                false
            }
        }
    }

    // ========================================================================
    // Record primitives
    // ========================================================================

    /// Creates a record in `collection`
    pub async fn try_create_record<T>(
        &self,
        collection: &str,
        data: &T,
    ) -> Result<StoreRecord, StoreError>
    where
        T: Serialize + ?Sized,
    {
        self.require_auth()?;
        let response = self
            .request(Method::POST, self.records_url(collection)?)
            .json(data)
            .send()
            .await?;
        parse_record(response).await
    }

    /// Creates a record, returning `None` (and logging) on failure
    pub async fn create_record<T>(&self, collection: &str, data: &T) -> Option<StoreRecord>
    where
        T: Serialize + ?Sized,
    {
        self.try_create_record(collection, data)
            .await
            .map_err(|e| error!(collection, error = %e, "Error creating record"))
            .ok()
    }

    /// Updates record `id` in `collection` with a partial body.
    ///
    /// `data` must not contain the `id` field.
    pub async fn try_update_record<T>(
        &self,
        collection: &str,
        id: &str,
        data: &T,
    ) -> Result<StoreRecord, StoreError>
    where
        T: Serialize + ?Sized,
    {
        self.require_auth()?;
        let response = self
            .request(Method::PATCH, self.record_url(collection, id)?)
            .json(data)
            .send()
            .await?;
        parse_record(response).await
    }

    /// Updates a record, returning `None` (and logging) on failure
    pub async fn update_record<T>(
        &self,
        collection: &str,
        id: &str,
        data: &T,
    ) -> Option<StoreRecord>
    where
        T: Serialize + ?Sized,
    {
        self.try_update_record(collection, id, data)
            .await
            .map_err(|e| error!(collection, record_id = id, error = %e, "Error updating record"))
            .ok()
    }

    /// Fetches record `id` from `collection`
    pub async fn try_get_record(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<StoreRecord, StoreError> {
        self.require_auth()?;
        let response = self
            .request(Method::GET, self.record_url(collection, id)?)
            .send()
            .await?;
        parse_record(response).await
    }

    /// Fetches a record, returning `None` (and logging) on failure
    pub async fn get_record(&self, collection: &str, id: &str) -> Option<StoreRecord> {
        self.try_get_record(collection, id)
            .await
            .map_err(|e| error!(collection, record_id = id, error = %e, "Error getting record"))
            .ok()
    }

    /// Lists records from `collection` with optional filter and sort
    pub async fn try_list_records(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<RecordPage, StoreError> {
        self.require_auth()?;
        let response = self
            .request(Method::GET, self.records_url(collection)?)
            .query(&query.params())
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("record page: {}", e)))
    }

    /// Lists records, returning `None` (and logging) on failure
    pub async fn list_records(&self, collection: &str, query: &ListQuery) -> Option<RecordPage> {
        self.try_list_records(collection, query)
            .await
            .map_err(|e| error!(collection, error = %e, "Error listing records"))
            .ok()
    }

    /// Deletes record `id` from `collection`
    pub async fn try_delete_record(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.require_auth()?;
        let response = self
            .request(Method::DELETE, self.record_url(collection, id)?)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Deletes a record, returning `false` (and logging) on failure
    pub async fn delete_record(&self, collection: &str, id: &str) -> bool {
        match self.try_delete_record(collection, id).await {
            Ok(()) => true,
            Err(e) => {
                error!(collection, record_id = id, error = %e, "Error deleting record");
                false
            }
        }
    }
}

// ============================================================================
// Response handling
// ============================================================================

/// Passes 2xx responses through and converts everything else into an error
async fn check_status(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn parse_record(response: Response) -> Result<StoreRecord, StoreError> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| StoreError::InvalidResponse(format!("record: {}", e)))
}

/// Maps a non-success response onto [`StoreError`], keeping the store's message
async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    debug!(status = status.as_u16(), body = %body, "Store returned error status");

    match status {
        StatusCode::BAD_REQUEST => StoreError::BadRequest(message),
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized(message),
        StatusCode::FORBIDDEN => StoreError::Forbidden(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        s if s.is_server_error() => StoreError::ServerError(message),
        s => StoreError::UnexpectedStatus {
            status: s.as_u16(),
            message,
        },
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}
