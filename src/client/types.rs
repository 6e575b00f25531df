//! Wire types for the collector and evaluator endpoints

use crate::time::Resolution;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Format a timestamp the way the collector and evaluator expect it
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An event submitted to the collector
///
/// Serializes to `{"type": ..., "data": ..., "time": ..., "id": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type name
    #[serde(rename = "type")]
    pub event_type: String,
    /// Arbitrary event payload
    #[serde(default = "empty_data")]
    pub data: Value,
    /// ISO-8601 timestamp
    pub time: String,
    /// Optional id; re-sending an id replaces the earlier event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

impl Event {
    /// New event stamped with the current time and empty data
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: empty_data(),
            time: format_time(Utc::now()),
            id: None,
        }
    }

    /// Builder: set the payload
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Builder: set the timestamp
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = format_time(time);
        self
    }

    /// Builder: set the id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Evaluator endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Raw matching events
    Event,
    /// Aggregated metric values
    Metric,
}

impl QueryKind {
    /// Path segment under the evaluator base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Optional parameters of an evaluator query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Lower bound (inclusive)
    pub start: Option<DateTime<Utc>>,
    /// Upper bound; the current time when unset
    pub stop: Option<DateTime<Utc>>,
    /// Maximum number of results
    pub limit: Option<u64>,
    /// Metric step; ignored for event queries
    pub step: Option<Resolution>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn stop(mut self, stop: DateTime<Utc>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn step(mut self, step: Resolution) -> Self {
        self.step = Some(step);
        self
    }

    /// Query-string pairs for `expression` against `kind`
    ///
    /// `now` fills in `stop` when unset.
    pub fn to_pairs(
        &self,
        kind: QueryKind,
        expression: &str,
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("expression", expression.to_string()),
            ("stop", format_time(self.stop.unwrap_or(now))),
        ];

        if let Some(start) = self.start {
            pairs.push(("start", format_time(start)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        if kind == QueryKind::Metric {
            if let Some(step) = self.step {
                pairs.push(("step", step.as_step().to_string()));
            }
        }

        pairs
    }
}
