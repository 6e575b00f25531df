//! Cube HTTP Client
//!
//! Transport for the Cube collector and evaluator:
//!
//! - `POST {collector}/event/put` - submit events
//! - `GET {evaluator}/event` - query events
//! - `GET {evaluator}/metric` - query metrics
//! - `GET {evaluator}/types` - list known event types
//!
//! The expression builder never touches the network; its rendered text is
//! passed as the `expression` parameter here.

mod http;
mod handle;
mod types;

pub use http::{CubeClient, CubeConfig, CubeError, CubeResult, API_VERSION};
pub use handle::EventHandle;
pub use types::{format_time, Event, QueryKind, QueryParams};

use async_trait::async_trait;
use serde_json::Value;

/// Operations the Cube service exposes
#[async_trait]
pub trait CubeTransport: Send + Sync {
    /// Submit events to the collector
    async fn put_events(&self, events: &[Event]) -> CubeResult<()>;

    /// Evaluate `expression` against the event or metric endpoint
    async fn query(&self, kind: QueryKind, expression: &str, params: &QueryParams) -> CubeResult<Value>;

    /// Names of the known event types
    async fn types(&self) -> CubeResult<Vec<String>>;
}
