//! Compound metric expressions
//!
//! Arithmetic on metrics builds a binary tree. Every combination point is
//! parenthesized when rendered, so the text always encodes the construction
//! order and never depends on the evaluator's operator precedence:
//!
//! ```text
//! m + m          (sum(request) + sum(request))
//! m + m - m      ((sum(request) + sum(request)) - sum(request))
//! m + m * 2      (sum(request) + (sum(request) * 2))
//! ```
//!
//! Equality is structural: `(a + b) + c` and `a + (b + c)` are not equal.

use super::error::{ExpressionError, ExpressionResult};
use super::metric::MetricExpression;
use serde_json::Number;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Arithmetic operator joining two metric nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operand of a compound metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricNode {
    /// A single aggregation
    Metric(MetricExpression),
    /// A nested compound expression
    Compound(CompoundMetricExpression),
    /// A numeric literal, rendered as a bare JSON number
    Constant(Number),
}

impl MetricNode {
    /// Numeric literal from a float
    ///
    /// NaN and infinities have no textual form in the expression language.
    pub fn constant_f64(value: f64) -> ExpressionResult<Self> {
        Number::from_f64(value).map(Self::Constant).ok_or_else(|| {
            ExpressionError::InvalidArgument(format!("{} is not a finite number", value))
        })
    }

    /// Render to expression-language text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric(metric) => write!(f, "{}", metric),
            Self::Compound(compound) => write!(f, "{}", compound),
            Self::Constant(n) => write!(f, "{}", n),
        }
    }
}

impl From<MetricExpression> for MetricNode {
    fn from(metric: MetricExpression) -> Self {
        Self::Metric(metric)
    }
}

impl From<&MetricExpression> for MetricNode {
    fn from(metric: &MetricExpression) -> Self {
        Self::Metric(metric.clone())
    }
}

impl From<CompoundMetricExpression> for MetricNode {
    fn from(compound: CompoundMetricExpression) -> Self {
        Self::Compound(compound)
    }
}

impl From<&CompoundMetricExpression> for MetricNode {
    fn from(compound: &CompoundMetricExpression) -> Self {
        Self::Compound(compound.clone())
    }
}

impl From<i32> for MetricNode {
    fn from(value: i32) -> Self {
        Self::Constant(value.into())
    }
}

impl From<i64> for MetricNode {
    fn from(value: i64) -> Self {
        Self::Constant(value.into())
    }
}

impl From<u32> for MetricNode {
    fn from(value: u32) -> Self {
        Self::Constant(value.into())
    }
}

impl From<u64> for MetricNode {
    fn from(value: u64) -> Self {
        Self::Constant(value.into())
    }
}

/// A metric, optionally combined with a right-hand operand
///
/// Without an operation this is a bare wrapper that renders exactly like its
/// left operand. This is the form a [`MetricExpression`] is promoted to
/// before it is combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundMetricExpression {
    left: Box<MetricNode>,
    operation: Option<(ArithmeticOp, Box<MetricNode>)>,
}

impl CompoundMetricExpression {
    /// Create a compound expression
    ///
    /// `operator` and `right` must be both present or both absent; otherwise
    /// this fails with [`ExpressionError::InvalidArgument`].
    pub fn new(
        left: impl Into<MetricNode>,
        operator: Option<ArithmeticOp>,
        right: Option<MetricNode>,
    ) -> ExpressionResult<Self> {
        let operation = match (operator, right) {
            (Some(op), Some(right)) => Some((op, Box::new(right))),
            (None, None) => None,
            (None, Some(_)) => {
                return Err(ExpressionError::InvalidArgument(
                    "An operator is required when a right-hand metric is given".to_string(),
                ))
            }
            (Some(op), None) => {
                return Err(ExpressionError::InvalidArgument(format!(
                    "Operator '{}' requires a right-hand metric",
                    op
                )))
            }
        };

        Ok(Self {
            left: Box::new(left.into()),
            operation,
        })
    }

    /// Wrap a single node without combining it
    pub fn bare(left: impl Into<MetricNode>) -> Self {
        Self {
            left: Box::new(left.into()),
            operation: None,
        }
    }

    /// New node `(self op right)`; `self` becomes the left subtree
    pub fn combine(self, op: ArithmeticOp, right: impl Into<MetricNode>) -> Self {
        Self {
            left: Box::new(MetricNode::Compound(self)),
            operation: Some((op, Box::new(right.into()))),
        }
    }

    pub fn left(&self) -> &MetricNode {
        &self.left
    }

    pub fn operator(&self) -> Option<ArithmeticOp> {
        self.operation.as_ref().map(|(op, _)| *op)
    }

    pub fn right(&self) -> Option<&MetricNode> {
        self.operation.as_ref().map(|(_, right)| right.as_ref())
    }

    /// True when no operation is attached
    pub fn is_bare(&self) -> bool {
        self.operation.is_none()
    }

    /// `self + right`
    pub fn plus(&self, right: impl Into<MetricNode>) -> Self {
        self + right
    }

    /// `self - right`
    pub fn minus(&self, right: impl Into<MetricNode>) -> Self {
        self - right
    }

    /// `self * right`
    pub fn times(&self, right: impl Into<MetricNode>) -> Self {
        self * right
    }

    /// `self / right`
    pub fn divided_by(&self, right: impl Into<MetricNode>) -> Self {
        self / right
    }

    /// Alias of [`divided_by`](Self::divided_by); builds the same tree
    pub fn true_div(&self, right: impl Into<MetricNode>) -> Self {
        self.divided_by(right)
    }

    /// Render to expression-language text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl From<MetricExpression> for CompoundMetricExpression {
    fn from(metric: MetricExpression) -> Self {
        Self::bare(metric)
    }
}

impl fmt::Display for CompoundMetricExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some((op, right)) => write!(f, "({} {} {})", self.left, op, right),
            None => write!(f, "{}", self.left),
        }
    }
}

macro_rules! impl_arithmetic {
    ($ty:ty => $($trait:ident :: $method:ident => $op:expr),+ $(,)?) => {
        $(
            impl<R: Into<MetricNode>> $trait<R> for $ty {
                type Output = CompoundMetricExpression;

                fn $method(self, rhs: R) -> CompoundMetricExpression {
                    CompoundMetricExpression::from(self).combine($op, rhs)
                }
            }

            impl<R: Into<MetricNode>> $trait<R> for &$ty {
                type Output = CompoundMetricExpression;

                fn $method(self, rhs: R) -> CompoundMetricExpression {
                    CompoundMetricExpression::from(self.clone()).combine($op, rhs)
                }
            }
        )+
    };
}

impl_arithmetic!(MetricExpression =>
    Add::add => ArithmeticOp::Add,
    Sub::sub => ArithmeticOp::Sub,
    Mul::mul => ArithmeticOp::Mul,
    Div::div => ArithmeticOp::Div,
);

impl_arithmetic!(CompoundMetricExpression =>
    Add::add => ArithmeticOp::Add,
    Sub::sub => ArithmeticOp::Sub,
    Mul::mul => ArithmeticOp::Mul,
    Div::div => ArithmeticOp::Div,
);
