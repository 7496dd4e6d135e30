//! Request parameters and their classification.
//!
//! A [`ParameterMap`] is an ordered `name → value` map. Values are JSON values so
//! that query strings (`gte[age]=18`), form bodies and JSON bodies all land in
//! the same shape. Insertion order is kept because the compiler emits predicates
//! in request order.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::{Map, Value};
use std::convert::Infallible;

/// Control parameters recognised by every compiler flavour.
pub const BASE_PARAMETERS: [&str; 7] = [
    "page",
    "per_page",
    "search",
    "search_by",
    "order",
    "order_by",
    "scopes",
];

/// Range parameters, reserved only when range operators are enabled.
pub const RANGE_PARAMETERS: [&str; 6] = ["lt", "gt", "lte", "gte", "min", "max"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    values: Map<String, Value>,
}

impl ParameterMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, keeping its original position when replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Parse a URL-encoded query string.
    ///
    /// Bracket notation nests values: `gte[age]=18` becomes `{"gte": {"age": "18"}}`
    /// and `ids[]=1&ids[]=2` becomes `{"ids": ["1", "2"]}`. All leaf values are
    /// strings. A repeated plain key keeps the last value.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let mut values = Map::new();
        for (raw_key, raw_value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let Some((root, path)) = split_key(&raw_key) else {
                continue;
            };
            insert_path(&mut values, root, &path, Value::String(raw_value.into_owned()));
        }
        Self { values }
    }

    /// Build from a JSON value. Anything but an object yields an empty map.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            other => {
                tracing::debug!(kind = json_kind(&other), "Ignoring non-object parameter payload");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a dotted path such as `scopes.active`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.values.get(first)?, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// True when the key is present and its value is not blank.
    ///
    /// Dotted paths are followed into nested maps. See [`is_filled`].
    #[must_use]
    pub fn filled(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(is_filled)
    }

    /// Scalar parameter as text, if it is filled.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| is_filled(v)).and_then(scalar_text)
    }

    /// Nested map parameter, if it is filled.
    #[must_use]
    pub fn map(&self, key: &str) -> Option<&Map<String, Value>> {
        match self.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters that are not control parameters, in request order.
    #[must_use]
    pub fn column_matches(&self, range_operators: bool) -> ColumnMatchSet {
        let entries = self
            .values
            .iter()
            .filter(|(key, _)| !is_reserved(key, range_operators))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        ColumnMatchSet { entries }
    }
}

impl From<Map<String, Value>> for ParameterMap {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ParameterMap {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .uri
            .query()
            .map(Self::from_query_str)
            .unwrap_or_default())
    }
}

/// Candidate exact-match parameters: everything that is not a control parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMatchSet {
    entries: Vec<(String, Value)>,
}

impl ColumnMatchSet {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `name` is a control parameter for the given compiler flavour.
#[must_use]
pub fn is_reserved(name: &str, range_operators: bool) -> bool {
    BASE_PARAMETERS.contains(&name) || (range_operators && RANGE_PARAMETERS.contains(&name))
}

/// A value is filled unless it is null, a whitespace-only string, or an empty
/// list or map. `false` and `0` are filled.
#[must_use]
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Text form of a scalar value. Lists and maps have none.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Split `a[b][]` into `("a", [Some("b"), None])`. `None` means "append".
fn split_key(raw: &str) -> Option<(&str, Vec<Option<&str>>)> {
    let (root, mut rest) = match raw.find('[') {
        Some(0) => return None,
        Some(i) => (&raw[..i], &raw[i..]),
        None => (raw, ""),
    };
    if root.is_empty() {
        return None;
    }

    let mut path = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(end) = stripped.find(']') else {
            break;
        };
        let segment = &stripped[..end];
        path.push((!segment.is_empty()).then_some(segment));
        rest = &stripped[end + 1..];
    }
    Some((root, path))
}

fn insert_path(target: &mut Map<String, Value>, key: &str, path: &[Option<&str>], value: Value) {
    let Some((next, rest)) = path.split_first() else {
        target.insert(key.to_string(), value);
        return;
    };

    let slot = target.entry(key.to_string()).or_insert(Value::Null);
    match next {
        None => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                if rest.is_empty() {
                    items.push(value);
                } else {
                    let mut nested = Map::new();
                    insert_path(&mut nested, "0", rest, value);
                    items.extend(nested.remove("0"));
                }
            }
        }
        Some(segment) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                insert_path(nested, segment, rest, value);
            }
        }
    }
}
