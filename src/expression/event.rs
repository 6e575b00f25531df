//! Event expressions
//!
//! An event expression names an event type, optionally selects properties,
//! and narrows matches with a chain of filters:
//!
//! ```text
//! request
//! request(elapsed_ms)
//! request(elapsed_ms).eq(path, "/").gt(elapsed_ms, 100)
//! ```
//!
//! Filter methods take `&self` and return a new expression, so one base
//! expression can be branched into several independent variants.

use super::filter::{Filter, FilterValue, InValues};
use std::fmt;

/// An event type with selected properties and a filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventExpression {
    event_type: String,
    properties: Vec<String>,
    filters: Vec<Filter>,
}

impl EventExpression {
    /// Create an expression matching all events of `event_type`
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            properties: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Builder: select one more property
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Builder: select several properties, in order
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Independent copy; later chaining on either side is not shared
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Append an arbitrary filter, returning a new expression
    pub fn filter(&self, filter: Filter) -> Self {
        let mut next = self.copy();
        next.filters.push(filter);
        next
    }

    /// Equal-to filter
    pub fn eq(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::eq(property, value))
    }

    /// Not-equal filter
    pub fn ne(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::ne(property, value))
    }

    /// Less-than filter
    pub fn lt(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::lt(property, value))
    }

    /// Less-than-or-equal filter
    pub fn le(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::le(property, value))
    }

    /// Greater-than filter
    pub fn gt(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::gt(property, value))
    }

    /// Greater-than-or-equal filter
    pub fn ge(&self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::ge(property, value))
    }

    /// Regular-expression filter
    pub fn re(&self, property: impl Into<String>, pattern: impl Into<FilterValue>) -> Self {
        self.filter(Filter::re(property, pattern))
    }

    /// Starts-with filter, sugar for `re(property, "^{prefix}")`
    pub fn starts_with(&self, property: impl Into<String>, prefix: &str) -> Self {
        self.filter(Filter::starts_with(property, prefix))
    }

    /// Ends-with filter, sugar for `re(property, ".*{suffix}$")`
    pub fn ends_with(&self, property: impl Into<String>, suffix: &str) -> Self {
        self.filter(Filter::ends_with(property, suffix))
    }

    /// Contains filter, sugar for `re(property, ".*{needle}.*")`
    pub fn contains(&self, property: impl Into<String>, needle: &str) -> Self {
        self.filter(Filter::contains(property, needle))
    }

    /// In-array filter
    ///
    /// A bare string is exploded into characters; see [`InValues`].
    pub fn in_array(&self, property: impl Into<String>, values: impl Into<InValues>) -> Self {
        self.filter(Filter::in_array(property, values))
    }

    /// Render to expression-language text
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EventExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_type)?;
        if !self.properties.is_empty() {
            write!(f, "({})", self.properties.join(", "))?;
        }
        for filter in &self.filters {
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bare_type() {
        assert_eq!(EventExpression::new("request").render(), "request");
    }

    #[test]
    fn test_render_properties() {
        let e = EventExpression::new("request").with_properties(["path", "elapsed_ms"]);
        assert_eq!(e.render(), "request(path, elapsed_ms)");
    }

    #[test]
    fn test_render_filter_chain() {
        let e = EventExpression::new("request")
            .with_property("elapsed_ms")
            .eq("path", "/")
            .gt("elapsed_ms", 100)
            .lt("elapsed_ms", 1000);
        assert_eq!(
            e.render(),
            r#"request(elapsed_ms).eq(path, "/").gt(elapsed_ms, 100).lt(elapsed_ms, 1000)"#
        );
    }

    #[test]
    fn test_each_filter_method() {
        let e = EventExpression::new("test");
        let cases = [
            ("eq", e.eq("elapsed_ms", 500)),
            ("ne", e.ne("elapsed_ms", 500)),
            ("lt", e.lt("elapsed_ms", 500)),
            ("le", e.le("elapsed_ms", 500)),
            ("gt", e.gt("elapsed_ms", 500)),
            ("ge", e.ge("elapsed_ms", 500)),
            ("re", e.re("elapsed_ms", 500)),
        ];

        for (name, filtered) in cases {
            assert_eq!(filtered.filters().len(), 1);
            assert_eq!(filtered.render(), format!("test.{}(elapsed_ms, 500)", name));
        }
        assert!(e.filters().is_empty());
    }

    #[test]
    fn test_regex_sugar() {
        let e = EventExpression::new("test");
        assert_eq!(e.starts_with("foo", "bar").render(), r#"test.re(foo, "^bar")"#);
        assert_eq!(e.ends_with("foo", "bar").render(), r#"test.re(foo, ".*bar$")"#);
        assert_eq!(e.contains("foo", "bar").render(), r#"test.re(foo, ".*bar.*")"#);
        assert_eq!(e.starts_with("foo", "bar"), e.re("foo", "^bar"));
    }

    #[test]
    fn test_in_array() {
        let e = EventExpression::new("test");
        assert_eq!(
            e.in_array("foo", vec!["bar", "baz"]).render(),
            r#"test.in(foo, ["bar", "baz"])"#
        );
        assert_eq!(
            e.in_array("foo", "bar").render(),
            r#"test.in(foo, ["b", "a", "r"])"#
        );

        let e = EventExpression::new("request").with_property("elapsed_ms");
        assert_eq!(
            e.in_array("path", "/event").render(),
            r#"request(elapsed_ms).in(path, ["/", "e", "v", "e", "n", "t"])"#
        );

        assert_eq!(e.in_array("path", "").render(), "request(elapsed_ms).in(path, [])");
        assert_eq!(
            e.in_array("city", "zü").render(),
            r#"request(elapsed_ms).in(city, ["z", "ü"])"#
        );
    }

    #[test]
    fn test_chaining_matches_filter_constructors() {
        let e = EventExpression::new("request");
        assert_eq!(e.eq("path", "/"), e.filter(Filter::eq("path", "/")));
        assert_eq!(e.ne("status", 200), e.filter(Filter::ne("status", 200)));
        assert_eq!(e.lt("elapsed_ms", 5), e.filter(Filter::lt("elapsed_ms", 5)));
        assert_eq!(e.le("elapsed_ms", 5), e.filter(Filter::le("elapsed_ms", 5)));
        assert_eq!(e.gt("elapsed_ms", 5), e.filter(Filter::gt("elapsed_ms", 5)));
        assert_eq!(e.ge("elapsed_ms", 5), e.filter(Filter::ge("elapsed_ms", 5)));
        assert_eq!(e.re("agent", "^curl"), e.filter(Filter::re("agent", "^curl")));
    }

    #[test]
    fn test_filter_chaining() {
        let e = EventExpression::new("test").eq("bar", "baz");
        assert_eq!(e.filters().len(), 1);
        let e = e.lt("fizz", "bang");
        assert_eq!(e.filters().len(), 2);
        let e = e.ge("foo", 4);
        assert_eq!(e.filters().len(), 3);
        assert_eq!(e.render(), r#"test.eq(bar, "baz").lt(fizz, "bang").ge(foo, 4)"#);
    }

    #[test]
    fn test_copy() {
        let e1 = EventExpression::new("request").with_properties(["path", "elapsed_ms"]);
        let e2 = e1.copy();
        assert_eq!(e1, e2);

        let e1 = e1.eq("path", "/");
        let e3 = e1.copy();
        assert_ne!(e1, e2);
        assert_eq!(e1, e3);
        assert_ne!(e2, e3);
    }

    #[test]
    fn test_branches_do_not_share_filters() {
        let base = EventExpression::new("request").with_property("elapsed_ms").eq("path", "/");
        let slow = base.gt("elapsed_ms", 500);
        let fast = base.lt("elapsed_ms", 50);

        assert_eq!(base.filters().len(), 1);
        assert_eq!(slow.filters().len(), 2);
        assert_eq!(fast.filters().len(), 2);
        assert_ne!(slow, fast);
        assert_eq!(
            slow.render(),
            r#"request(elapsed_ms).eq(path, "/").gt(elapsed_ms, 500)"#
        );
        assert_eq!(
            fast.render(),
            r#"request(elapsed_ms).eq(path, "/").lt(elapsed_ms, 50)"#
        );
    }

    #[test]
    fn test_equality() {
        let mut e1 = EventExpression::new("request");
        let mut e2 = EventExpression::new("request");
        assert_eq!(e1, e2);

        e1 = EventExpression::new("request").with_property("path");
        assert_ne!(e1, e2);
        e2 = EventExpression::new("request").with_property("path");
        assert_eq!(e1, e2);

        e1 = EventExpression::new("request").with_properties(["path", "elapsed_ms"]);
        assert_ne!(e1, e2);
        e2 = EventExpression::new("request").with_properties(["path", "elapsed_ms"]);
        assert_eq!(e1, e2);

        e1 = e1.eq("path", "/");
        assert_ne!(e1, e2);
        e2 = e2.eq("path", "/");
        assert_eq!(e1, e2);

        e1 = e1.gt("elapsed_ms", 500);
        assert_ne!(e1, e2);
        e2 = e2.gt("elapsed_ms", 500);
        assert_eq!(e1, e2);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = EventExpression::new("request").eq("a", 1).eq("b", 2);
        let b = EventExpression::new("request").eq("b", 2).eq("a", 1);
        assert_ne!(a, b);

        let a = EventExpression::new("request").with_properties(["x", "y"]);
        let b = EventExpression::new("request").with_properties(["y", "x"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_render_is_deterministic() {
        let e = EventExpression::new("request").with_property("elapsed_ms").eq("path", "/");
        assert_eq!(e.render(), e.render());
    }
}
