//! HTTP transport behind the API client

use super::ApiError;
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// A single authenticated request to the API
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    /// Path relative to the API base URL, e.g. `/api/domain`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer_token: String,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, path: &str, bearer_token: String) -> Self {
        TransportRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            bearer_token,
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and raw body of a response; the session gate inspects the
/// status before anything decodes the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends requests to the API.
///
/// Implementations only move bytes. A request that cannot complete maps to
/// [`ApiError::Network`]; every received response, whatever its status, is
/// returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        ReqwestTransport {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let url = self.url(&request.path);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = builder.bearer_auth(&request.bearer_token);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| network_error(&request, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| network_error(&request, e))?;

        Ok(TransportResponse { status, body })
    }
}

fn network_error(request: &TransportRequest, error: reqwest::Error) -> ApiError {
    log::warn!("{} {} did not complete: {}", request.method, request.path, error);
    ApiError::Network(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = TransportRequest::new(HttpMethod::Delete, "/api/domain", "tok".to_string())
            .with_query("domainId", "d 1");

        assert_eq!(request.query, vec![("domainId".to_string(), "d 1".to_string())]);
        assert!(request.body.is_none());

        let request = TransportRequest::new(HttpMethod::Post, "/api/domain", "tok".to_string())
            .with_body(json!({"name": "example.com"}));
        assert_eq!(request.body.unwrap()["name"], "example.com");
    }

    #[test]
    fn test_base_url_joining() {
        let transport = ReqwestTransport::new("https://api.syra.example/", Duration::from_secs(5));
        assert_eq!(transport.url("/api/user"), "https://api.syra.example/api/user");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 on loopback is the discard service and is normally closed
        let transport = ReqwestTransport::new("http://127.0.0.1:9", Duration::from_secs(2));
        let request = TransportRequest::new(HttpMethod::Get, "/api/user", "tok".to_string());

        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.to_string(), crate::api::NETWORK_ERROR);
        assert!(!err.to_string().contains("127.0.0.1"));
    }
}
