//! # Kubernetes HTTP Client
//!
//! Minimal ConfigMap client for the Kubernetes core/v1 API.
//!
//! No authentication is performed here: point it at `kubectl proxy` or at an
//! API endpoint reachable without credentials.

use super::{ConfigMapStore, StoreError};
use alertconf_core::ConfigMap;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Endpoint used when none is configured (the `kubectl proxy` default).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001";

/// Response body of a list call.
#[derive(Debug, Deserialize)]
struct ConfigMapList {
    #[serde(default)]
    items: Vec<ConfigMap>,
}

/// HTTP client for ConfigMaps.
#[derive(Clone, Debug)]
pub struct KubeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl KubeClient {
    /// Create a client for `endpoint` whose requests give up after
    /// `request_timeout`.
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self, StoreError> {
        let endpoint = if endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            endpoint
        };
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The API endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Result<Url, StoreError> {
        Url::parse(&format!("{}{}", self.endpoint, path)).map_err(|e| {
            StoreError::Transport(format!("invalid url {}{path}: {e}", self.endpoint))
        })
    }

    fn collection_path(namespace: &str) -> String {
        if namespace.is_empty() {
            "/api/v1/configmaps".to_string()
        } else {
            format!("/api/v1/namespaces/{namespace}/configmaps")
        }
    }

    /// Send a request and map connection failures.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        req.send()
            .await
            .map_err(|e| StoreError::Transport(format!("{}: {e}", self.endpoint)))
    }

    /// Check the status code and decode the JSON body.
    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        context: impl FnOnce() -> String,
    ) -> Result<T, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                context: context(),
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Shared body of create and update.
    async fn write(&self, method: Method, record: &ConfigMap) -> Result<ConfigMap, StoreError> {
        let meta = &record.metadata;
        let (path, verb) = if method == Method::POST {
            (Self::collection_path(&meta.namespace), "creating")
        } else {
            (
                format!("{}/{}", Self::collection_path(&meta.namespace), meta.name),
                "updating",
            )
        };
        let body = serde_json::to_vec(record)
            .map_err(|e| StoreError::Encode(format!("configmap {}: {e}", meta.name)))?;

        let req = self
            .http
            .request(method, self.url(&path)?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let resp = self.send(req).await?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                namespace: meta.namespace.clone(),
                name: meta.name.clone(),
            });
        }
        Self::decode(resp, || {
            format!("error {verb} configmap {}/{}", meta.namespace, meta.name)
        })
        .await
    }
}

impl ConfigMapStore for KubeClient {
    /// GET /api/v1/[namespaces/{ns}/]configmaps?labelSelector=...
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<ConfigMap>, StoreError> {
        let mut url = self.url(&Self::collection_path(namespace))?;
        if !selector.is_empty() {
            url.query_pairs_mut().append_pair("labelSelector", selector);
        }

        let resp = self.send(self.http.get(url)).await?;
        let list: ConfigMapList = Self::decode(resp, || {
            format!("error listing configmaps in namespace '{namespace}'")
        })
        .await?;
        Ok(list.items)
    }

    /// GET /api/v1/namespaces/{ns}/configmaps/{name}
    async fn get(&self, namespace: &str, name: &str) -> Result<ConfigMap, StoreError> {
        let path = format!("{}/{name}", Self::collection_path(namespace));
        let resp = self.send(self.http.get(self.url(&path)?)).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
        Self::decode(resp, || format!("error getting configmap {namespace}/{name}")).await
    }

    /// POST /api/v1/namespaces/{ns}/configmaps
    async fn create(&self, record: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.write(Method::POST, record).await
    }

    /// PUT /api/v1/namespaces/{ns}/configmaps/{name}
    async fn update(&self, record: &ConfigMap) -> Result<ConfigMap, StoreError> {
        self.write(Method::PUT, record).await
    }

    /// Poll GET /api until anything answers.
    async fn wait_until_reachable(
        &self,
        timeout: Duration,
        poll: Duration,
    ) -> Result<(), StoreError> {
        let url = self.url("/api")?;
        let probe = async {
            let mut ticker = tokio::time::interval(poll);
            loop {
                ticker.tick().await;
                match self.http.get(url.clone()).send().await {
                    Ok(_) => return,
                    Err(e) => {
                        tracing::debug!(endpoint = %self.endpoint, "API not reachable yet: {e}");
                    }
                }
            }
        };
        tokio::time::timeout(timeout, probe)
            .await
            .map_err(|_| StoreError::Unreachable(timeout))
    }
}

// =============================================================================
// TESTS
// =============================================================================
