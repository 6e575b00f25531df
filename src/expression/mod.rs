//! Cube Expression Builder
//!
//! Builds the text of Cube's query mini-language:
//!
//! - **Filter**: a single predicate, `.eq(path, "/")`
//! - **EventExpression**: an event type, selected properties and filters
//! - **MetricExpression**: an aggregation over one event expression
//! - **CompoundMetricExpression**: arithmetic over metrics
//!
//! Every node is immutable once built; chaining and arithmetic return new
//! values. The rendered text is what goes in the `expression` query
//! parameter of the evaluator.
//!
//! # Example
//!
//! ```rust
//! use cube_client::expression::{EventExpression, MetricExpression};
//!
//! let home = EventExpression::new("request")
//!     .with_property("elapsed_ms")
//!     .eq("path", "/");
//! let slow = home.gt("elapsed_ms", 500);
//!
//! let expr = MetricExpression::sum(home)? - MetricExpression::min(slow)?;
//! assert_eq!(
//!     expr.render(),
//!     r#"(sum(request(elapsed_ms).eq(path, "/")) - min(request(elapsed_ms).eq(path, "/").gt(elapsed_ms, 500)))"#
//! );
//! # Ok::<(), cube_client::expression::ExpressionError>(())
//! ```

mod compound;
mod error;
mod event;
mod filter;
mod metric;

pub use compound::{ArithmeticOp, CompoundMetricExpression, MetricNode};
pub use error::{ExpressionError, ExpressionResult};
pub use event::EventExpression;
pub use filter::{Filter, FilterKind, FilterValue, InValues};
pub use metric::{MetricExpression, MetricType};
