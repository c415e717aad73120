//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpRequest, TimedResponse};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, trace};

/// HTTP client trait for issuing timed requests
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and wait for the full response body.
    ///
    /// Any status code is a successful send; only transport-level failures
    /// are returned as errors.
    async fn send(&self, request: HttpRequest) -> Result<TimedResponse, HttpError>;
}

#[async_trait::async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<TimedResponse, HttpError> {
        (**self).send(request).await
    }
}

/// `reqwest`-backed client sharing one connection pool across virtual users
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    config: HttpConfig,
}

impl ReqwestClient {
    /// Create a client with specific configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HTTP client with timeout: {}s",
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .build()
            .map_err(|e| HttpError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a client with default configuration
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<TimedResponse, HttpError> {
        trace!("Building {} request to {}", request.method, request.url);

        let mut builder = self
            .client
            .request(reqwest::Method::from(request.method), &request.url);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let elapsed = started.elapsed();

        debug!(
            "{} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status,
            elapsed.as_millis(),
            body.len()
        );

        Ok(TimedResponse::new(status, elapsed, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .send(HttpRequest::get(format!("{}/api/tasks", mock_server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/tasks"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"title": "Write unit tests"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .send(HttpRequest::post(
                format!("{}/api/tasks", mock_server.uri()),
                json!({"title": "Write unit tests"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .send(HttpRequest::new(
                HttpMethod::Delete,
                format!("{}/api/tasks/9", mock_server.uri()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_elapsed_includes_server_delay() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(120)))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new().unwrap();
        let response = client
            .send(HttpRequest::get(mock_server.uri()))
            .await
            .unwrap();

        assert!(response.elapsed >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let config = HttpConfig {
            timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let client = ReqwestClient::with_config(config).unwrap();
        let error = client
            .send(HttpRequest::get(mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(error, HttpError::Timeout(_)));
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ReqwestClient::new().unwrap();
        let error = client
            .send(HttpRequest::get(format!("http://127.0.0.1:{}/api/tasks", port)))
            .await
            .unwrap_err();

        assert!(error.is_transport());
    }
}
