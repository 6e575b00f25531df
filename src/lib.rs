//! # Cube Client
//!
//! Client for the Cube time-series analytics service: submit events to the
//! collector and query events and metrics from the evaluator.
//!
//! ## Modules
//!
//! - [`expression`]: Builder for Cube's event and metric expression language
//! - [`client`]: HTTP transport for the collector and evaluator
//! - [`time`]: Step resolutions and query-bound helpers
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cube_client::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CubeClient::new(CubeConfig::new("localhost"))?;
//!
//!     // Submit an event
//!     let requests = client.event_type("request");
//!     requests.put(json!({"path": "/", "elapsed_ms": 42})).await?;
//!
//!     // Average latency on the home page, hourly, over the last day
//!     let home = EventExpression::new("request").eq("path", "/");
//!     let total = MetricExpression::sum(home.copy().with_property("elapsed_ms"))?;
//!     let count = MetricExpression::sum(home)?;
//!
//!     let params = QueryParams::new()
//!         .start(time::yesterday(time::now()))
//!         .step(Resolution::OneHour);
//!     let values = client.metric(total / count, &params).await?;
//!
//!     println!("{}", values);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod expression;
pub mod time;

// Re-export top-level types for convenience
pub use client::{
    format_time, CubeClient, CubeConfig, CubeError, CubeResult, CubeTransport, Event, EventHandle,
    QueryKind, QueryParams,
};

pub use expression::{
    ArithmeticOp, CompoundMetricExpression, EventExpression, ExpressionError, ExpressionResult,
    Filter, FilterKind, FilterValue, InValues, MetricExpression, MetricNode, MetricType,
};

pub use time::{Resolution, TimeError, TimeResult};

pub use config::{Config, ConfigError, CubeSection, LoggingConfig};
