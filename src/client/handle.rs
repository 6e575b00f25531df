//! Per-event-type shortcut

use super::http::CubeResult;
use super::types::{Event, QueryKind, QueryParams};
use super::CubeTransport;
use crate::expression::{EventExpression, ExpressionError, MetricExpression, MetricType};
use serde_json::Value;
use std::fmt;

/// A transport bound to a single event type
///
/// ```rust,ignore
/// let requests = client.event_type("request");
/// requests.put(json!({"path": "/", "elapsed_ms": 12})).await?;
/// let latest = requests.events(&QueryParams::new().limit(10)).await?;
/// ```
pub struct EventHandle<'a, T: CubeTransport + ?Sized> {
    transport: &'a T,
    event_type: String,
}

impl<'a, T: CubeTransport + ?Sized> EventHandle<'a, T> {
    pub fn new(transport: &'a T, event_type: impl Into<String>) -> Self {
        Self {
            transport,
            event_type: event_type.into(),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Starting point for building expressions over this type
    pub fn expression(&self) -> EventExpression {
        EventExpression::new(self.event_type.as_str())
    }

    /// Submit an event of this type stamped with the current time
    pub async fn put(&self, data: Value) -> CubeResult<Vec<Event>> {
        self.put_event(Event::new(self.event_type.as_str()).data(data))
            .await
    }

    /// Submit a prepared event, forcing its type to this handle's type
    pub async fn put_event(&self, mut event: Event) -> CubeResult<Vec<Event>> {
        event.event_type = self.event_type.clone();
        let events = vec![event];
        self.transport.put_events(&events).await?;
        Ok(events)
    }

    /// All events of this type
    pub async fn events(&self, params: &QueryParams) -> CubeResult<Value> {
        self.transport
            .query(QueryKind::Event, &self.event_type, params)
            .await
    }

    /// Events matching a filtered expression over this type
    pub async fn events_matching(
        &self,
        expression: &EventExpression,
        params: &QueryParams,
    ) -> CubeResult<Value> {
        if expression.event_type() != self.event_type {
            return Err(ExpressionError::InvalidArgument(format!(
                "Expression targets '{}' but this handle is bound to '{}'",
                expression.event_type(),
                self.event_type
            ))
            .into());
        }

        self.transport
            .query(QueryKind::Event, &expression.render(), params)
            .await
    }

    /// Evaluate an arbitrary metric expression
    pub async fn metric(&self, expression: impl fmt::Display, params: &QueryParams) -> CubeResult<Value> {
        let expression = expression.to_string();
        self.transport
            .query(QueryKind::Metric, &expression, params)
            .await
    }

    /// Evaluate `metric_type` over this type, optionally on one property
    pub async fn aggregate(
        &self,
        metric_type: MetricType,
        property: Option<&str>,
        params: &QueryParams,
    ) -> CubeResult<Value> {
        let mut event = self.expression();
        if let Some(property) = property {
            event = event.with_property(property);
        }

        let metric = MetricExpression::new(metric_type, event)?;
        self.metric(&metric, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CubeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls instead of sending them
    #[derive(Default)]
    struct FakeTransport {
        puts: Mutex<Vec<Event>>,
        queries: Mutex<Vec<(QueryKind, String)>>,
    }

    #[async_trait]
    impl CubeTransport for FakeTransport {
        async fn put_events(&self, events: &[Event]) -> CubeResult<()> {
            self.puts.lock().unwrap().extend_from_slice(events);
            Ok(())
        }

        async fn query(&self, kind: QueryKind, expression: &str, _params: &QueryParams) -> CubeResult<Value> {
            self.queries
                .lock()
                .unwrap()
                .push((kind, expression.to_string()));
            Ok(Value::Array(Vec::new()))
        }

        async fn types(&self) -> CubeResult<Vec<String>> {
            Ok(vec!["request".to_string()])
        }
    }

    #[tokio::test]
    async fn test_put_uses_handle_type() {
        let transport = FakeTransport::default();
        let handle = EventHandle::new(&transport, "request");

        handle.put(serde_json::json!({"path": "/"})).await.unwrap();
        handle.put_event(Event::new("other")).await.unwrap();

        let puts = transport.puts.lock().unwrap();
        assert_eq!(puts.len(), 2);
        assert!(puts.iter().all(|e| e.event_type == "request"));
        assert_eq!(puts[0].data["path"], "/");
    }

    #[tokio::test]
    async fn test_events_query_bare_type() {
        let transport = FakeTransport::default();
        let handle = EventHandle::new(&transport, "request");

        handle.events(&QueryParams::new()).await.unwrap();
        let filtered = handle.expression().eq("path", "/");
        handle
            .events_matching(&filtered, &QueryParams::new())
            .await
            .unwrap();

        let queries = transport.queries.lock().unwrap();
        assert_eq!(queries[0], (QueryKind::Event, "request".to_string()));
        assert_eq!(queries[1], (QueryKind::Event, r#"request.eq(path, "/")"#.to_string()));
    }

    #[tokio::test]
    async fn test_events_matching_rejects_other_type() {
        let transport = FakeTransport::default();
        let handle = EventHandle::new(&transport, "request");

        let err = handle
            .events_matching(&EventExpression::new("login"), &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CubeError::Expression(ExpressionError::InvalidArgument(_))));
        assert!(transport.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_aggregate() {
        let transport = FakeTransport::default();
        let handle = EventHandle::new(&transport, "request");

        handle
            .aggregate(MetricType::Median, Some("elapsed_ms"), &QueryParams::new())
            .await
            .unwrap();
        handle
            .aggregate(MetricType::Sum, None, &QueryParams::new())
            .await
            .unwrap();

        let queries = transport.queries.lock().unwrap();
        assert_eq!(queries[0], (QueryKind::Metric, "median(request(elapsed_ms))".to_string()));
        assert_eq!(queries[1], (QueryKind::Metric, "sum(request)".to_string()));
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let transport = FakeTransport::default();
        let dynamic: &dyn CubeTransport = &transport;
        let handle = EventHandle::new(dynamic, "request");
        handle.events(&QueryParams::new()).await.unwrap();
        assert_eq!(dynamic.types().await.unwrap(), vec!["request".to_string()]);
    }
}
