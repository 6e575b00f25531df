//! Event filters
//!
//! A filter is a single predicate appended to an event expression. It renders
//! as `.{kind}({property}, {value})` where the value is written as a JSON
//! literal:
//!
//! ```text
//! .eq(path, "/")
//! .gt(elapsed_ms, 500)
//! .in(path, ["/", "/about"])
//! ```

use super::error::{ExpressionError, ExpressionResult};
use serde_json::Number;
use std::fmt;
use std::str::FromStr;

/// Comparison performed by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Less than
    Lt,
    /// Less than or equal to
    Le,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Ge,
    /// Regular expression match
    Re,
    /// Membership in an array of strings
    In,
}

impl FilterKind {
    /// Name used in the expression language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Re => "re",
            Self::In => "in",
        }
    }

    /// All filter kinds, in declaration order
    pub fn all() -> &'static [FilterKind] {
        &[
            Self::Eq,
            Self::Ne,
            Self::Lt,
            Self::Le,
            Self::Gt,
            Self::Ge,
            Self::Re,
            Self::In,
        ]
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ExpressionError::UnknownFilterKind(s.to_string()))
    }
}

/// Value a property is compared against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// String literal, rendered double-quoted with JSON escaping
    String(String),
    /// Bare JSON number
    Number(Number),
    /// JSON boolean
    Bool(bool),
    /// Ordered list of strings (used by `in`)
    List(Vec<String>),
}

impl FilterValue {
    /// Build a numeric value from a float
    ///
    /// Returns `None` for NaN and infinities, which have no JSON form.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    fn write_json(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(&json_string(s)),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&json_string(item))?;
                }
                f.write_str("]")
            }
        }
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_json(f)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Number> for FilterValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<InValues> for FilterValue {
    fn from(values: InValues) -> Self {
        Self::List(values.into_inner())
    }
}

/// Argument to an `in` filter
///
/// Two construction paths exist:
///
/// - [`InValues::list`] keeps each element as one array member.
/// - [`InValues::chars`] explodes a single string into its characters, so
///   `"abc"` becomes `["a", "b", "c"]`.
///
/// Converting a bare `&str` or `String` takes the **exploding** path. This is
/// long-standing client behaviour that existing queries rely on; wrap the
/// string in a one-element list if you mean "equal to this one value".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InValues(Vec<String>);

impl InValues {
    /// One array member per element
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// One array member per character of `value`
    pub fn chars(value: &str) -> Self {
        Self(value.chars().map(String::from).collect())
    }

    /// The array members
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for InValues {
    fn from(value: &str) -> Self {
        Self::chars(value)
    }
}

impl From<String> for InValues {
    fn from(value: String) -> Self {
        Self::chars(&value)
    }
}

impl From<Vec<String>> for InValues {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for InValues {
    fn from(values: Vec<&str>) -> Self {
        Self::list(values)
    }
}

impl From<&[&str]> for InValues {
    fn from(values: &[&str]) -> Self {
        Self::list(values.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for InValues {
    fn from(values: [&str; N]) -> Self {
        Self::list(values)
    }
}

/// A single predicate on an event property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    kind: FilterKind,
    property: String,
    value: FilterValue,
}

impl Filter {
    /// Create a filter of the given kind
    pub fn new(kind: FilterKind, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            kind,
            property: property.into(),
            value: value.into(),
        }
    }

    /// Create a filter from its expression-language name (`"eq"`, `"re"`, ...)
    pub fn from_name(
        kind: &str,
        property: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> ExpressionResult<Self> {
        Ok(Self::new(kind.parse()?, property, value))
    }

    /// `.eq(property, value)`
    pub fn eq(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Eq, property, value)
    }

    /// `.ne(property, value)`
    pub fn ne(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Ne, property, value)
    }

    /// `.lt(property, value)`
    pub fn lt(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Lt, property, value)
    }

    /// `.le(property, value)`
    pub fn le(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Le, property, value)
    }

    /// `.gt(property, value)`
    pub fn gt(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Gt, property, value)
    }

    /// `.ge(property, value)`
    pub fn ge(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Ge, property, value)
    }

    /// `.re(property, pattern)`
    pub fn re(property: impl Into<String>, pattern: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::Re, property, pattern)
    }

    /// `in` filter over the given values
    ///
    /// Unlike `Filter::new(FilterKind::In, ..)`, which keeps a scalar value
    /// as-is, this always renders an array.
    pub fn in_array(property: impl Into<String>, values: impl Into<InValues>) -> Self {
        let values: InValues = values.into();
        Self::new(FilterKind::In, property, values)
    }

    /// Regex filter anchored at the start: `^{prefix}`
    ///
    /// `prefix` is interpolated verbatim; escape regex metacharacters first.
    pub fn starts_with(property: impl Into<String>, prefix: &str) -> Self {
        Self::re(property, format!("^{}", prefix))
    }

    /// Regex filter anchored at the end: `.*{suffix}$`
    ///
    /// `suffix` is interpolated verbatim; escape regex metacharacters first.
    pub fn ends_with(property: impl Into<String>, suffix: &str) -> Self {
        Self::re(property, format!(".*{}$", suffix))
    }

    /// Regex filter matching anywhere: `.*{needle}.*`
    pub fn contains(property: impl Into<String>, needle: &str) -> Self {
        Self::re(property, format!(".*{}.*", needle))
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Render to expression-language text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}({}, ", self.kind, self.property)?;
        self.value.write_json(f)?;
        f.write_str(")")
    }
}
