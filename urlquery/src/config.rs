//! Compiler configuration.
//!
//! A single [`QueryConfig`] drives both historical compiler flavours: the
//! extended one (range operators plus per-parameter validation) and the basic
//! one (neither, searching over the fillable columns). The process-wide
//! instance is read once at the start of every compile and never written during
//! one.

use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, PoisonError, RwLock};

/// Environment variable prefix read by [`QueryConfig::from_env`].
pub const ENV_PREFIX: &str = "URLQUERY_";

const DEFAULT_SORT_COLUMN: &str = "created_at";
const DEFAULT_PER_PAGE: u64 = 15;

static GLOBAL_CONFIG: LazyLock<RwLock<QueryConfig>> =
    LazyLock::new(|| RwLock::new(QueryConfig::default()));

/// Which columns form the allow-list for filtering and searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// Every table column except the hidden ones.
    #[default]
    Queryable,
    /// The id column plus the fillable columns, minus the hidden ones.
    Searchable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Skip invalid parameter and scope names instead of failing the compile.
    pub ignore_invalid_parameters: bool,
    /// Recognise `lt`, `gt`, `lte`, `gte`, `min` and `max`.
    pub range_operators: bool,
    /// Check exact-match parameter names against the allow-list.
    pub validate_parameters: bool,
    /// Also check range columns, `search_by` and `order_by` against the allow-list.
    pub validate_all_columns: bool,
    pub column_source: ColumnSource,
    /// Column used when the request has no `order_by`.
    pub default_sort_column: String,
    /// Page size used by the pagination helpers when `per_page` is absent.
    pub default_per_page: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl QueryConfig {
    /// Range operators and exact-match validation enabled.
    #[must_use]
    pub fn extended() -> Self {
        Self {
            ignore_invalid_parameters: true,
            range_operators: true,
            validate_parameters: true,
            validate_all_columns: false,
            column_source: ColumnSource::Queryable,
            default_sort_column: DEFAULT_SORT_COLUMN.to_string(),
            default_per_page: DEFAULT_PER_PAGE,
        }
    }

    /// No range operators, no exact-match validation, search over the id and
    /// fillable columns.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            range_operators: false,
            validate_parameters: false,
            column_source: ColumnSource::Searchable,
            ..Self::extended()
        }
    }

    /// Strict mode: fail on the first invalid parameter or scope name.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.ignore_invalid_parameters = false;
        self
    }

    #[must_use]
    pub fn with_validate_all_columns(mut self, enabled: bool) -> Self {
        self.validate_all_columns = enabled;
        self
    }

    /// Snapshot of the process-wide configuration.
    pub fn global() -> Self {
        GLOBAL_CONFIG
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the process-wide configuration.
    pub fn set_global(config: Self) {
        *GLOBAL_CONFIG
            .write()
            .unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Build a configuration from `URLQUERY_*` environment variables, falling
    /// back to the defaults for anything unset or unparseable.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `URLQUERY_IGNORE_INVALID_PARAMETERS` | `ignore_invalid_parameters` |
    /// | `URLQUERY_RANGE_OPERATORS` | `range_operators` |
    /// | `URLQUERY_VALIDATE_PARAMETERS` | `validate_parameters` |
    /// | `URLQUERY_VALIDATE_ALL_COLUMNS` | `validate_all_columns` |
    /// | `URLQUERY_COLUMN_SOURCE` | `column_source` (`queryable` / `searchable`) |
    /// | `URLQUERY_DEFAULT_SORT_COLUMN` | `default_sort_column` |
    /// | `URLQUERY_DEFAULT_PER_PAGE` | `default_per_page` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(raw) = read("IGNORE_INVALID_PARAMETERS") {
            set_bool(&mut config.ignore_invalid_parameters, "IGNORE_INVALID_PARAMETERS", &raw);
        }
        if let Some(raw) = read("RANGE_OPERATORS") {
            set_bool(&mut config.range_operators, "RANGE_OPERATORS", &raw);
        }
        if let Some(raw) = read("VALIDATE_PARAMETERS") {
            set_bool(&mut config.validate_parameters, "VALIDATE_PARAMETERS", &raw);
        }
        if let Some(raw) = read("VALIDATE_ALL_COLUMNS") {
            set_bool(&mut config.validate_all_columns, "VALIDATE_ALL_COLUMNS", &raw);
        }
        if let Some(raw) = read("COLUMN_SOURCE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "queryable" => config.column_source = ColumnSource::Queryable,
                "searchable" => config.column_source = ColumnSource::Searchable,
                other => tracing::warn!(value = other, "Ignoring unknown {ENV_PREFIX}COLUMN_SOURCE"),
            }
        }
        if let Some(raw) = read("DEFAULT_SORT_COLUMN") {
            let column = raw.trim();
            if column.is_empty() {
                tracing::warn!("Ignoring empty {ENV_PREFIX}DEFAULT_SORT_COLUMN");
            } else {
                config.default_sort_column = column.to_string();
            }
        }
        if let Some(raw) = read("DEFAULT_PER_PAGE") {
            match raw.trim().parse::<u64>() {
                Ok(per_page) if per_page > 0 => config.default_per_page = per_page,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_PREFIX}DEFAULT_PER_PAGE"),
            }
        }

        config
    }
}

fn set_bool(target: &mut bool, name: &str, raw: &str) {
    match parse_bool(raw) {
        Some(value) => *target = value,
        None => tracing::warn!(value = raw, "Ignoring non-boolean {ENV_PREFIX}{name}"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
