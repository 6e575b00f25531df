//! Metric expressions
//!
//! A metric aggregates an event expression: `sum(request(elapsed_ms))`.
//! Metrics may select at most one event property.

use super::compound::{CompoundMetricExpression, MetricNode};
use super::error::{ExpressionError, ExpressionResult};
use super::event::EventExpression;
use std::fmt;
use std::str::FromStr;

/// Aggregation applied by a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Sum of the selected property, or event count when none is selected
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Median value
    Median,
    /// Number of distinct values
    Distinct,
}

impl MetricType {
    /// Name used in the expression language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
            Self::Distinct => "distinct",
        }
    }

    /// All metric types
    pub fn all() -> &'static [MetricType] {
        &[Self::Sum, Self::Min, Self::Max, Self::Median, Self::Distinct]
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| {
                ExpressionError::InvalidArgument(format!(
                    "Unknown metric type '{}'. Use sum, min, max, median or distinct",
                    s
                ))
            })
    }
}

/// An aggregation over a single event expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricExpression {
    metric_type: MetricType,
    event: EventExpression,
}

impl MetricExpression {
    /// Create a metric over `event`
    ///
    /// Fails with [`ExpressionError::InvalidArgument`] when the event
    /// expression selects more than one property.
    pub fn new(metric_type: MetricType, event: EventExpression) -> ExpressionResult<Self> {
        if event.properties().len() > 1 {
            return Err(ExpressionError::InvalidArgument(format!(
                "Events for metrics may only select a single event property, got ({})",
                event.properties().join(", ")
            )));
        }

        Ok(Self { metric_type, event })
    }

    /// A `sum` metric
    pub fn sum(event: EventExpression) -> ExpressionResult<Self> {
        Self::new(MetricType::Sum, event)
    }

    /// A `min` metric
    pub fn min(event: EventExpression) -> ExpressionResult<Self> {
        Self::new(MetricType::Min, event)
    }

    /// A `max` metric
    pub fn max(event: EventExpression) -> ExpressionResult<Self> {
        Self::new(MetricType::Max, event)
    }

    /// A `median` metric
    pub fn median(event: EventExpression) -> ExpressionResult<Self> {
        Self::new(MetricType::Median, event)
    }

    /// A `distinct` metric
    pub fn distinct(event: EventExpression) -> ExpressionResult<Self> {
        Self::new(MetricType::Distinct, event)
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn event(&self) -> &EventExpression {
        &self.event
    }

    /// `self + right`
    pub fn plus(&self, right: impl Into<MetricNode>) -> CompoundMetricExpression {
        self + right
    }

    /// `self - right`
    pub fn minus(&self, right: impl Into<MetricNode>) -> CompoundMetricExpression {
        self - right
    }

    /// `self * right`
    pub fn times(&self, right: impl Into<MetricNode>) -> CompoundMetricExpression {
        self * right
    }

    /// `self / right`
    pub fn divided_by(&self, right: impl Into<MetricNode>) -> CompoundMetricExpression {
        self / right
    }

    /// Alias of [`divided_by`](Self::divided_by); builds the same tree
    pub fn true_div(&self, right: impl Into<MetricNode>) -> CompoundMetricExpression {
        self.divided_by(right)
    }

    /// Render to expression-language text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.metric_type, self.event)
    }
}
