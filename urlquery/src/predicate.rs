//! The compiler's output: an ordered list of predicates.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Comparison operator of a range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">=")]
    Gte,
}

impl Operator {
    /// Operator for a range parameter name. `min` and `max` are aliases of
    /// `gte` and `lte`.
    #[must_use]
    pub fn from_parameter(name: &str) -> Option<Self> {
        match name {
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "lte" | "max" => Some(Self::Lte),
            "gte" | "min" => Some(Self::Gte),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse a case-insensitive `asc` / `desc`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of query logic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Equals {
        column: String,
        value: Value,
    },
    Compare {
        column: String,
        operator: Operator,
        value: Value,
    },
    /// Starts a pattern-match group.
    Like {
        column: String,
        pattern: String,
    },
    /// Alternative of the preceding `Like` group.
    OrLike {
        column: String,
        pattern: String,
    },
    OrderBy {
        column: String,
        direction: Direction,
    },
    ScopeCall {
        scope: String,
        value: Value,
    },
}

impl Predicate {
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn compare(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Compare {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    pub fn or_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::OrLike {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    pub fn order_by(column: impl Into<String>, direction: Direction) -> Self {
        Self::OrderBy {
            column: column.into(),
            direction,
        }
    }

    pub fn scope(scope: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ScopeCall {
            scope: scope.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { column, value } => write!(f, "where {column} = {value}"),
            Self::Compare {
                column,
                operator,
                value,
            } => write!(f, "where {column} {operator} {value}"),
            Self::Like { column, pattern } => write!(f, "where {column} like '{pattern}'"),
            Self::OrLike { column, pattern } => write!(f, "or where {column} like '{pattern}'"),
            Self::OrderBy { column, direction } => write!(f, "order by {column} {direction}"),
            Self::ScopeCall { scope, value } => write!(f, "scope {scope}({value})"),
        }
    }
}

/// Ordered, not-yet-executed query built by one compile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryDescription {
    predicates: Vec<Predicate>,
}

impl QueryDescription {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        tracing::trace!(%predicate, "Emitting predicate");
        self.predicates.push(predicate);
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub fn into_predicates(self) -> Vec<Predicate> {
        self.predicates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<'a> IntoIterator for &'a QueryDescription {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}

impl fmt::Display for QueryDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}
