//! The transport seam and the council API client.
//!
//! [`Transport`] is the object-safe HTTP seam: JSON values in, JSON
//! values out, one method per verb. [`HttpTransport`] is the reqwest
//! implementation; tests substitute doubles. [`ApiClient`] layers the
//! council API's path conventions and typed decoding on top.
//!
//! Resource paths follow the server's convention:
//! `expense-transactions/find-many`,
//! `fund-requests/create-fund-request`,
//! `igps/update-igp/7`, `locker-rentals/delete-locker-rental/3` — the
//! operation segment embeds the singular entity name.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use quorum_core::Page;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Object-safe HTTP seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: Option<&Value>) -> Result<Value>;
    async fn post(&self, path: &str, body: Value) -> Result<Value>;
    async fn patch(&self, path: &str, body: Value) -> Result<Value>;
    async fn delete(&self, path: &str) -> Result<()>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), message));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: Option<&Value>) -> Result<Value> {
        let mut request = self.http.get(self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        Self::decode(request.send().await?).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        Self::decode(self.http.post(self.url(path)).json(&body).send().await?).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        Self::decode(self.http.patch(self.url(path)).json(&body).send().await?).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), message));
        }
        Ok(())
    }
}

/// Typed client for the council API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client over an arbitrary transport (tests inject doubles here).
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client over a reqwest transport built from `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// `GET {resource}/find-many` with query-string filters.
    pub async fn find_many<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: &impl Serialize,
    ) -> Result<Page<T>> {
        let query = serde_json::to_value(filters).map_err(quorum_core::Error::encode)?;
        let value = self
            .transport
            .get(&format!("{resource}/find-many"), Some(&query))
            .await?;
        Ok(serde_json::from_value(value).map_err(quorum_core::Error::decode)?)
    }

    /// `GET {resource}/find-one/{id}`.
    pub async fn find_one<T: DeserializeOwned>(&self, resource: &str, id: i64) -> Result<T> {
        let value = self
            .transport
            .get(&format!("{resource}/find-one/{id}"), None)
            .await?;
        Ok(serde_json::from_value(value).map_err(quorum_core::Error::decode)?)
    }

    /// `POST {resource}/create-{entity}`.
    pub async fn create<T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(quorum_core::Error::encode)?;
        let value = self
            .transport
            .post(&create_path(resource), body)
            .await?;
        Ok(serde_json::from_value(value).map_err(quorum_core::Error::decode)?)
    }

    /// `PATCH {resource}/update-{entity}/{id}`.
    pub async fn update<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: i64,
        body: &impl Serialize,
    ) -> Result<T> {
        let body = serde_json::to_value(body).map_err(quorum_core::Error::encode)?;
        let value = self
            .transport
            .patch(&update_path(resource, id), body)
            .await?;
        Ok(serde_json::from_value(value).map_err(quorum_core::Error::decode)?)
    }

    /// `DELETE {resource}/delete-{entity}/{id}`.
    pub async fn delete(&self, resource: &str, id: i64) -> Result<()> {
        self.transport.delete(&delete_path(resource, id)).await
    }
}

/// Singular entity name: the resource segment minus its plural `s`.
fn singular(resource: &str) -> &str {
    resource.strip_suffix('s').unwrap_or(resource)
}

fn create_path(resource: &str) -> String {
    format!("{resource}/create-{}", singular(resource))
}

fn update_path(resource: &str, id: i64) -> String {
    format!("{resource}/update-{}/{id}", singular(resource))
}

fn delete_path(resource: &str, id: i64) -> String {
    format!("{resource}/delete-{}/{id}", singular(resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_paths_embed_singular_name() {
        assert_eq!(
            create_path("fund-requests"),
            "fund-requests/create-fund-request"
        );
        assert_eq!(
            create_path("expense-transactions"),
            "expense-transactions/create-expense-transaction"
        );
        assert_eq!(update_path("igps", 7), "igps/update-igp/7");
        assert_eq!(
            delete_path("locker-rentals", 3),
            "locker-rentals/delete-locker-rental/3"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let transport = HttpTransport::new(&ClientConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            timeout_secs: None,
        })
        .unwrap();
        assert_eq!(
            transport.url("igps/find-many"),
            "http://localhost:3000/api/igps/find-many"
        );
    }
}
