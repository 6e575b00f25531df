//! Cube REST Client
//!
//! reqwest-based implementation of [`CubeTransport`].

use super::handle::EventHandle;
use super::types::{Event, QueryKind, QueryParams};
use super::CubeTransport;
use crate::expression::ExpressionError;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Version segment of every Cube endpoint URL
pub const API_VERSION: &str = "1.0";

/// Connection settings for a Cube deployment
#[derive(Debug, Clone)]
pub struct CubeConfig {
    /// Host running the collector and evaluator
    pub hostname: String,
    /// Collector port
    pub collector_port: u16,
    /// Evaluator port
    pub evaluator_port: u16,
    /// API version path segment
    pub api_version: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            collector_port: 1080,
            evaluator_port: 1081,
            api_version: API_VERSION.to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl CubeConfig {
    /// Default ports on the given host
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Collector base URL, with trailing slash
    pub fn collector_url(&self) -> String {
        format!(
            "http://{}:{}/{}/",
            self.hostname, self.collector_port, self.api_version
        )
    }

    /// Evaluator base URL, with trailing slash
    pub fn evaluator_url(&self) -> String {
        format!(
            "http://{}:{}/{}/",
            self.hostname, self.evaluator_port, self.api_version
        )
    }
}

/// Cube REST API client
pub struct CubeClient {
    client: Client,
    config: CubeConfig,
}

impl CubeClient {
    /// Create a client for the given deployment
    pub fn new(config: CubeConfig) -> CubeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    /// Submit one event, returning what was sent
    pub async fn put(&self, event: Event) -> CubeResult<Vec<Event>> {
        self.put_batch(vec![event]).await
    }

    /// Submit several events in one request, returning what was sent
    pub async fn put_batch(&self, events: Vec<Event>) -> CubeResult<Vec<Event>> {
        self.put_events(&events).await?;
        Ok(events)
    }

    /// Query the event endpoint
    pub async fn event(&self, expression: impl fmt::Display, params: &QueryParams) -> CubeResult<Value> {
        let expression = expression.to_string();
        self.query(QueryKind::Event, &expression, params).await
    }

    /// Query the metric endpoint
    pub async fn metric(&self, expression: impl fmt::Display, params: &QueryParams) -> CubeResult<Value> {
        let expression = expression.to_string();
        self.query(QueryKind::Metric, &expression, params).await
    }

    /// Shortcut bound to one event type
    pub fn event_type(&self, name: impl Into<String>) -> EventHandle<'_, Self> {
        EventHandle::new(self, name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> CubeResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(request_error)?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CubeTransport for CubeClient {
    async fn put_events(&self, events: &[Event]) -> CubeResult<()> {
        let url = format!("{}event/put", self.config.collector_url());
        tracing::debug!("Submitting {} event(s) to {}", events.len(), url);

        let response = self
            .client
            .post(&url)
            .json(events)
            .send()
            .await
            .map_err(request_error)?;

        check_status(response).await?;
        Ok(())
    }

    async fn query(&self, kind: QueryKind, expression: &str, params: &QueryParams) -> CubeResult<Value> {
        let url = format!("{}{}", self.config.evaluator_url(), kind.path());
        tracing::debug!("Querying {} with expression {}", url, expression);

        let pairs = params.to_pairs(kind, expression, Utc::now());
        self.get_json(&url, &pairs).await
    }

    async fn types(&self) -> CubeResult<Vec<String>> {
        let url = format!("{}types", self.config.evaluator_url());
        tracing::debug!("Listing event types from {}", url);
        self.get_json(&url, &[]).await
    }
}

fn request_error(e: reqwest::Error) -> CubeError {
    if e.is_timeout() {
        CubeError::Timeout
    } else if e.is_connect() {
        CubeError::Unavailable
    } else {
        CubeError::Request(e)
    }
}

/// Any non-success status is a hard failure
async fn check_status(response: Response) -> CubeResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Cube returned {} for {}: {}", status, url, body);

    Err(CubeError::Status {
        status: status.as_u16(),
        body,
    })
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to Cube
#[derive(Error, Debug)]
pub enum CubeError {
    #[error("Cube unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),
}

/// Result type for client operations
pub type CubeResult<T> = Result<T, CubeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{EventExpression, MetricExpression};
    use crate::time::Resolution;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<Value>>>,
    }

    async fn put_handler(State(recorder): State<Recorder>, Json(events): Json<Vec<Value>>) -> Json<Value> {
        recorder.events.lock().unwrap().extend(events);
        Json(json!({}))
    }

    async fn echo_handler(Query(params): Query<HashMap<String, String>>) -> Json<HashMap<String, String>> {
        Json(params)
    }

    async fn types_handler() -> Json<Vec<&'static str>> {
        Json(vec!["request", "login"])
    }

    async fn failing_handler() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    fn cube_router(recorder: Recorder) -> Router {
        Router::new()
            .route("/1.0/event/put", post(put_handler))
            .route("/1.0/event", get(echo_handler))
            .route("/1.0/metric", get(echo_handler))
            .route("/1.0/types", get(types_handler))
            .with_state(recorder)
    }

    async fn spawn_cube(router: Router) -> CubeClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        CubeClient::new(CubeConfig {
            hostname: "127.0.0.1".to_string(),
            collector_port: port,
            evaluator_port: port,
            ..CubeConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = CubeConfig::default();
        assert_eq!(config.collector_url(), "http://localhost:1080/1.0/");
        assert_eq!(config.evaluator_url(), "http://localhost:1081/1.0/");
    }

    #[test]
    fn test_config_for_host() {
        let config = CubeConfig::new("cube.internal");
        assert_eq!(config.collector_url(), "http://cube.internal:1080/1.0/");
        assert_eq!(config.evaluator_port, 1081);
    }

    #[tokio::test]
    async fn test_put_posts_json_array() {
        let recorder = Recorder::default();
        let client = spawn_cube(cube_router(recorder.clone())).await;

        let event = Event::new("request").data(json!({"path": "/"})).id("e-1");
        let sent = client.put(event.clone()).await.unwrap();
        assert_eq!(sent, vec![event]);

        let received = recorder.events.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["type"], "request");
        assert_eq!(received[0]["data"]["path"], "/");
        assert_eq!(received[0]["id"], "e-1");
        assert!(received[0]["time"].is_string());
    }

    #[tokio::test]
    async fn test_metric_query_parameters() {
        let client = spawn_cube(cube_router(Recorder::default())).await;

        let expr = MetricExpression::sum(
            EventExpression::new("request").with_property("elapsed_ms").eq("path", "/"),
        )
        .unwrap();
        let params = QueryParams::new().limit(5).step(Resolution::OneHour);

        let echoed = client.metric(&expr, &params).await.unwrap();
        assert_eq!(echoed["expression"], r#"sum(request(elapsed_ms).eq(path, "/"))"#);
        assert_eq!(echoed["limit"], "5");
        assert_eq!(echoed["step"], "36e5");
        assert!(echoed["stop"].is_string());
        assert!(echoed.get("start").is_none());
    }

    #[tokio::test]
    async fn test_event_query_omits_step() {
        let client = spawn_cube(cube_router(Recorder::default())).await;

        let params = QueryParams::new().step(Resolution::OneDay);
        let echoed = client.event("request", &params).await.unwrap();
        assert_eq!(echoed["expression"], "request");
        assert!(echoed.get("step").is_none());
    }

    #[tokio::test]
    async fn test_types() {
        let client = spawn_cube(cube_router(Recorder::default())).await;
        let types = client.types().await.unwrap();
        assert_eq!(types, vec!["request".to_string(), "login".to_string()]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_types_request_logged_at_debug() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = spawn_cube(cube_router(Recorder::default())).await;
        client.types().await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("DEBUG"));
        assert!(output.contains("Listing event types from http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let router = Router::new().route("/1.0/types", get(failing_handler));
        let client = spawn_cube(router).await;

        match client.types().await {
            Err(CubeError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = CubeClient::new(CubeConfig {
            hostname: "127.0.0.1".to_string(),
            collector_port: port,
            evaluator_port: port,
            ..CubeConfig::default()
        })
        .unwrap();

        let err = client.put(Event::new("request")).await.unwrap_err();
        assert!(matches!(err, CubeError::Unavailable));
    }
}
