//! HTTP client for a PostgREST-compatible row store.
//!
//! Tables live under `{base_url}/rest/v1/{table}`. Every request carries the
//! project's public `apikey`; the bearer token is either that same key or a
//! signed-in user's access token, so the store's row-level policies see the
//! real caller.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use super::{Query, RowStore, StoreError};

/// Error body returned by PostgREST on failure.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Row store reached over HTTP.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Create a client for the project at `base_url` (e.g. `https://xyz.supabase.co`).
    pub fn new(base_url: &str, anon_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str, anon_key: String) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            anon_key,
            access_token: None,
        }
    }

    /// A copy that authenticates as the holder of `access_token`.
    pub fn with_access_token(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Ensure the response has a success status code, turning a failure body
    /// into [`StoreError::Api`].
    async fn ensure_success(
        table: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        tracing::debug!(table, status = status.as_u16(), "Row store response");
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = match (body.message, body.details) {
            (Some(m), Some(d)) if !d.is_empty() => format!("{m} ({d})"),
            (Some(m), _) => m,
            (None, _) => text,
        };

        Err(StoreError::Api {
            status: status.as_u16(),
            code: body.code,
            message,
        })
    }

    async fn rows(table: &str, response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        let response = Self::ensure_success(table, response).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }

    fn first_row(table: &str, rows: Vec<Value>) -> Result<Value, StoreError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NoRowReturned(table.to_string()))
    }
}

#[async_trait]
impl RowStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(Method::GET, &self.table_url(table))
            .query(&query.to_pairs())
            .send()
            .await?;
        Self::rows(table, response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let response = self
            .request(Method::POST, &self.table_url(table))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows = Self::rows(table, response).await?;
        Self::first_row(table, rows)
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(Method::PATCH, &self.table_url(table))
            .query(&query.to_pairs())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::rows(table, response).await
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Value, StoreError> {
        let response = self
            .request(Method::POST, &self.table_url(table))
            .query(&[("on_conflict", on_conflict.join(","))])
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;
        let rows = Self::rows(table, response).await?;
        Self::first_row(table, rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET, &format!("{}/", self.rest_url))
            .send()
            .await?;
        Self::ensure_success("/", response).await?;
        Ok(())
    }

    fn for_user(&self, access_token: &str) -> Option<Arc<dyn RowStore>> {
        Some(Arc::new(self.with_access_token(access_token)))
    }
}
