//! Cosmos DB SQL API over HTTPS.
//!
//! Requests are signed with the account master key (`type=master`, HMAC-SHA256
//! over verb, resource type, resource link and date). Queries follow
//! `x-ms-continuation` until the last page.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use idstore_core::{StoreError, StoreResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use url::Url;

use super::policy::ContainerProperties;
use super::query::DocumentQuery;
use super::{ContainerLink, DocumentBackend};
use crate::config::CosmosDbConfig;

type HmacSha256 = Hmac<Sha256>;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2018-12-31";

const HEADER_DATE: &str = "x-ms-date";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_THROUGHPUT: &str = "x-ms-offer-throughput";
const HEADER_IS_QUERY: &str = "x-ms-documentdb-isquery";
const HEADER_CROSS_PARTITION: &str = "x-ms-documentdb-query-enablecrosspartition";
const HEADER_MAX_ITEM_COUNT: &str = "x-ms-max-item-count";
const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Remote [`DocumentBackend`].
#[derive(Clone)]
pub struct RestBackend {
    http: Client,
    endpoint: Url,
    key: Arc<[u8]>,
    max_item_count: u32,
}

impl fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBackend")
            .field("endpoint", &self.endpoint.as_str())
            .field("max_item_count", &self.max_item_count)
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    /// Creates a backend for an account endpoint and base64 master key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the endpoint is not a URL or the key is
    /// not valid base64.
    pub fn new(endpoint: &str, primary_key: &str, timeout: Duration) -> StoreResult<Self> {
        let mut endpoint = Url::parse(endpoint.trim())
            .map_err(|e| StoreError::invalid(format!("invalid endpoint url: {e}")))?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let key = STANDARD
            .decode(primary_key.trim())
            .map_err(|e| StoreError::invalid(format!("primary key is not valid base64: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            key: key.into(),
            max_item_count: 100,
        })
    }

    /// Creates a backend from validated configuration.
    pub fn from_config(config: &CosmosDbConfig) -> StoreResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url.as_deref().unwrap_or_default();
        let key = config.primary_key.as_deref().unwrap_or_default();
        let mut backend = Self::new(endpoint, key, config.request_timeout())?;
        backend.max_item_count = config.max_item_count;
        Ok(backend)
    }

    #[must_use]
    pub fn with_max_item_count(mut self, max_item_count: u32) -> Self {
        self.max_item_count = max_item_count.max(1);
        self
    }

    // ---- Signing ----

    fn authorization(
        &self,
        method: &Method,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> StoreResult<String> {
        sign(&self.key, method, resource_type, resource_link, date)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        resource_type: &str,
        resource_link: &str,
    ) -> StoreResult<RequestBuilder> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| StoreError::invalid(format!("invalid resource path {path}: {e}")))?;
        let date = httpdate::fmt_http_date(SystemTime::now());
        let authorization = self.authorization(&method, resource_type, resource_link, &date)?;

        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(HEADER_DATE, date)
            .header(HEADER_VERSION, API_VERSION))
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> StoreResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::unavailable(format!("{context}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, context, body = %body, "document store request failed");
        Err(map_status(status, context, &body))
    }

    async fn read_json(response: Response, context: &str) -> StoreResult<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::unavailable(format!("{context}: unreadable response: {e}")))
    }
}

/// Builds the `authorization` header value for a master-key request.
fn sign(
    key: &[u8],
    method: &Method,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> StoreResult<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        method.as_str().to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StoreError::invalid(format!("unusable primary key: {e}")))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(urlencoding::encode(&format!("type=master&ver=1.0&sig={signature}")).into_owned())
}

fn partition_header(partition_key: &str) -> String {
    json!([partition_key]).to_string()
}

/// Maps a non-success status onto the storage error taxonomy.
fn map_status(status: StatusCode, context: &str, body: &str) -> StoreError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    let message = format!("{context}: HTTP {status}: {detail}");

    match status {
        StatusCode::NOT_FOUND => StoreError::not_found(message),
        StatusCode::CONFLICT => StoreError::conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => StoreError::invalid(message),
        _ => StoreError::unavailable(message),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

#[async_trait]
impl DocumentBackend for RestBackend {
    async fn create_database(&self, database: &str) -> StoreResult<()> {
        let request = self
            .request(Method::POST, "dbs", "dbs", "")?
            .json(&json!({ "id": database }));
        self.send(request, &format!("create database {database}"))
            .await
            .map(|_| ())
    }

    async fn create_container(
        &self,
        database: &str,
        properties: &ContainerProperties,
        throughput: u32,
    ) -> StoreResult<()> {
        let link = format!("dbs/{database}");
        let request = self
            .request(Method::POST, &format!("{link}/colls"), "colls", &link)?
            .header(HEADER_THROUGHPUT, throughput.to_string())
            .json(properties);
        self.send(
            request,
            &format!("create container {database}/{}", properties.id),
        )
        .await
        .map(|_| ())
    }

    async fn create_document(
        &self,
        link: &ContainerLink,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let container = link.resource_link();
        let request = self
            .request(Method::POST, &format!("{container}/docs"), "docs", &container)?
            .header(HEADER_PARTITION_KEY, partition_header(partition_key))
            .json(&document);
        let context = format!("create document in {link}");
        let response = self.send(request, &context).await?;
        Self::read_json(response, &context).await
    }

    async fn replace_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
        document: Value,
    ) -> StoreResult<Value> {
        let resource = format!("{}/docs/{id}", link.resource_link());
        let request = self
            .request(Method::PUT, &resource, "docs", &resource)?
            .header(HEADER_PARTITION_KEY, partition_header(partition_key))
            .json(&document);
        let context = format!("replace document {id} in {link}");
        let response = self.send(request, &context).await?;
        Self::read_json(response, &context).await
    }

    async fn delete_document(
        &self,
        link: &ContainerLink,
        id: &str,
        partition_key: &str,
    ) -> StoreResult<()> {
        let resource = format!("{}/docs/{id}", link.resource_link());
        let request = self
            .request(Method::DELETE, &resource, "docs", &resource)?
            .header(HEADER_PARTITION_KEY, partition_header(partition_key));
        self.send(request, &format!("delete document {id} in {link}"))
            .await
            .map(|_| ())
    }

    async fn query_documents(
        &self,
        link: &ContainerLink,
        query: &DocumentQuery,
        partition_key: Option<&str>,
    ) -> StoreResult<Vec<Value>> {
        let container = link.resource_link();
        let body = serde_json::to_vec(&query.to_sql())?;
        let context = format!("query {link}");

        let mut documents = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let mut request = self
                .request(Method::POST, &format!("{container}/docs"), "docs", &container)?
                .header(CONTENT_TYPE, "application/query+json")
                .header(HEADER_IS_QUERY, "True")
                .header(HEADER_MAX_ITEM_COUNT, self.max_item_count.to_string())
                .body(body.clone());
            request = match partition_key {
                Some(pk) => request.header(HEADER_PARTITION_KEY, partition_header(pk)),
                None => request.header(HEADER_CROSS_PARTITION, "True"),
            };
            if let Some(token) = &continuation {
                request = request.header(HEADER_CONTINUATION, token.as_str());
            }

            let response = self.send(request, &context).await?;
            let next = response
                .headers()
                .get(HEADER_CONTINUATION)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned);

            let page: QueryPage = response.json().await.map_err(|e| {
                StoreError::unavailable(format!("{context}: unreadable response: {e}"))
            })?;
            documents.extend(page.documents);

            match next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        tracing::trace!(container = %link, count = documents.len(), "query completed");
        Ok(documents)
    }
}
