use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::params::{ParameterMap, scalar_text};

/// Scalar control parameters understood by list endpoints.
///
/// Any other parameter is an exact-match filter on the column of the same name
/// (`?role_id=3`). Nested parameters are documented here but parsed by the
/// compiler:
///
/// - **Ranges:** `lt[col]`, `gt[col]`, `lte[col]`, `gte[col]`, `min[col]` (alias
///   of `gte`), `max[col]` (alias of `lte`), e.g. `?gte[age]=18&lte[age]=65`
/// - **Scopes:** `scopes[name]=value`, e.g. `?scopes[active]=1`
///
/// `page` and `per_page` accept numbers or numeric strings.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ControlParameters {
    /// Page number (1-based).
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Number of items per page. Falls back to the resource default.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[param(example = 15)]
    pub per_page: Option<u64>,
    /// Substring searched in every queryable column, or only in `search_by`.
    #[param(example = "ann")]
    pub search: Option<String>,
    /// Restrict `search` to one column.
    #[param(example = "email")]
    pub search_by: Option<String>,
    /// Sort direction, `asc` (default) or `desc`.
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Sort column. Defaults to `created_at`.
    #[param(example = "name")]
    pub order_by: Option<String>,
}

const TEXT_FIELDS: [&str; 4] = ["search", "search_by", "order", "order_by"];
const NUMBER_FIELDS: [&str; 2] = ["page", "per_page"];

impl ControlParameters {
    /// Read the control parameters out of a request's parameter map.
    ///
    /// An unparseable `page` or `per_page` is dropped on its own rather than
    /// failing.
    #[must_use]
    pub fn from_params(params: &ParameterMap) -> Self {
        let mut fields = Map::new();
        for name in TEXT_FIELDS {
            if let Some(text) = params.get(name).and_then(scalar_text) {
                fields.insert(name.to_string(), Value::String(text));
            }
        }
        for name in NUMBER_FIELDS {
            let Some(value) = params.get(name).filter(|v| v.is_string() || v.is_number()) else {
                continue;
            };
            let probe = Map::from_iter([(name.to_string(), value.clone())]);
            match serde_json::from_value::<Self>(Value::Object(probe)) {
                Ok(_) => {
                    fields.insert(name.to_string(), value.clone());
                }
                Err(error) => {
                    tracing::debug!(parameter = name, %error, "Ignoring malformed pagination parameter");
                }
            }
        }

        serde_json::from_value(Value::Object(fields)).unwrap_or_default()
    }
}
