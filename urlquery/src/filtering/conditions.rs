use serde_json::Value;

use crate::compiler::CompileContext;
use crate::errors::QueryError;
use crate::params::{RANGE_PARAMETERS, is_filled, json_kind, scalar_text};
use crate::predicate::{Operator, Predicate};

/// Exact-match stage: one `Equals` per filled, non-reserved parameter.
///
/// A parameter whose name is an integer (`?3=abc`) is matched against its value
/// coerced to an integer, and ends the stage: parameters after it are not
/// matched.
pub(crate) fn build_exact_matches(ctx: &mut CompileContext<'_>) -> Result<(), QueryError> {
    let matches = ctx.params.column_matches(ctx.config.range_operators);

    for (key, value) in matches.iter() {
        if !is_filled(value) {
            continue;
        }
        if ctx.config.validate_parameters && !ctx.check_column(key)? {
            continue;
        }
        if scalar_text(value).is_none() {
            tracing::debug!(parameter = key, kind = json_kind(value), "Skipping non-scalar match");
            continue;
        }

        if is_integer_key(key) {
            ctx.push(Predicate::equals(key, coerce_integer(value)));
            return Ok(());
        }
        ctx.push(Predicate::equals(key, value.clone()));
    }

    Ok(())
}

/// Range stage: `lt`, `gt`, `lte`, `gte`, `min`, `max`, each a
/// `column → value` map, handled in the order they appear in the request.
pub(crate) fn build_ranges(ctx: &mut CompileContext<'_>) -> Result<(), QueryError> {
    let params = ctx.params;

    for name in params.keys() {
        if !RANGE_PARAMETERS.contains(&name.as_str()) {
            continue;
        }
        let Some(operator) = Operator::from_parameter(name) else {
            continue;
        };
        let Some(bounds) = params.map(name) else {
            if params.filled(name) {
                tracing::debug!(parameter = %name, "Skipping range parameter that is not a map");
            }
            continue;
        };

        for (column, value) in bounds {
            if !is_filled(value) {
                continue;
            }
            if !ctx.check_extra_column(column)? {
                continue;
            }
            ctx.push(Predicate::compare(column.as_str(), operator, value.clone()));
        }
    }

    Ok(())
}

fn is_integer_key(key: &str) -> bool {
    key.parse::<i64>().is_ok()
}

/// Integer cast with leading-number semantics: `"42abc"` → 42, `"abc"` → 0.
fn coerce_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(truncate_float))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        Value::Bool(b) => i64::from(*b),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_float(f: f64) -> i64 {
    // `as` saturates at the i64 bounds and maps NaN to 0
    f.trunc() as i64
}

fn leading_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = digits[..end].parse::<i64>().unwrap_or(if end == 0 { 0 } else { i64::MAX });
    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::QueryCompiler;
    use crate::config::QueryConfig;
    use crate::params::ParameterMap;
    use crate::predicate::Direction;
    use crate::schema::{ResourceDescriptor, ResourceSchema, TableCatalog};
    use serde_json::json;

    fn schema(columns: &[&str]) -> ResourceSchema {
        let catalog = TableCatalog::new().table("items", columns.iter().copied());
        ResourceSchema::introspect(&catalog, &ResourceDescriptor::new("items")).unwrap()
    }

    fn compile(config: QueryConfig, columns: &[&str], params: &ParameterMap) -> Result<Vec<Predicate>, QueryError> {
        QueryCompiler::new(config)
            .compile(&schema(columns), &["unused"], params)
            .map(crate::predicate::QueryDescription::into_predicates)
    }

    fn default_sort() -> Predicate {
        Predicate::order_by("created_at", Direction::Asc)
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("42"), 42);
        assert_eq!(leading_integer("  -7"), -7);
        assert_eq!(leading_integer("+3"), 3);
        assert_eq!(leading_integer("12abc"), 12);
        assert_eq!(leading_integer("abc"), 0);
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("-"), 0);
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(&json!(5)), 5);
        assert_eq!(coerce_integer(&json!(5.9)), 5);
        assert_eq!(coerce_integer(&json!("17 apples")), 17);
        assert_eq!(coerce_integer(&json!(true)), 1);
        assert_eq!(coerce_integer(&json!(null)), 0);
    }

    #[test]
    fn test_integer_key_stops_exact_match_stage() {
        // An integer-named column ends the exact-match stage: `name` comes after
        // it and is not matched. Kept for compatibility with existing clients.
        let params = ParameterMap::new()
            .with("email", "a@b.c")
            .with("3", "12abc")
            .with("name", "Ann");
        let predicates = compile(
            QueryConfig::extended(),
            &["id", "3", "name", "email", "created_at"],
            &params,
        )
        .unwrap();
        assert_eq!(
            predicates,
            vec![
                Predicate::equals("email", "a@b.c"),
                Predicate::equals("3", 12),
                default_sort(),
            ]
        );
    }

    #[test]
    fn test_invalid_integer_key_does_not_stop_stage() {
        let params = ParameterMap::new().with("3", "x").with("name", "Ann");
        let predicates = compile(QueryConfig::extended(), &["id", "name"], &params).unwrap();
        assert_eq!(predicates, vec![Predicate::equals("name", "Ann"), default_sort()]);
    }

    #[test]
    fn test_list_values_are_not_matched() {
        let params = ParameterMap::from_query_str("id[]=1&id[]=2&name=Ann");
        let predicates = compile(QueryConfig::extended().strict(), &["id", "name"], &params).unwrap();
        assert_eq!(predicates, vec![Predicate::equals("name", "Ann"), default_sort()]);
    }

    #[test]
    fn test_range_skips_blank_values() {
        let params = ParameterMap::from_json(json!({"lt": {"age": "", "score": 0, "rank": null}}));
        let predicates = compile(QueryConfig::extended(), &["id"], &params).unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::compare("score", Operator::Lt, 0), default_sort()]
        );
    }

    #[test]
    fn test_range_scalar_is_ignored() {
        let params = ParameterMap::new().with("gt", "5");
        let predicates = compile(QueryConfig::extended().strict(), &["id"], &params).unwrap();
        assert_eq!(predicates, vec![default_sort()]);
    }

    #[test]
    fn test_range_columns_unchecked_by_default() {
        let params = ParameterMap::from_query_str("gte[salary]=1000");
        let predicates = compile(QueryConfig::extended().strict(), &["id"], &params).unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::compare("salary", Operator::Gte, "1000"), default_sort()]
        );
    }

    #[test]
    fn test_range_columns_checked_when_hardened() {
        let params = ParameterMap::from_query_str("gte[salary]=1000&lte[age]=65");

        let err = compile(
            QueryConfig::extended().strict().with_validate_all_columns(true),
            &["id", "age"],
            &params,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidParameter { ref parameter } if parameter == "salary"));

        let predicates = compile(
            QueryConfig::extended().with_validate_all_columns(true),
            &["id", "age"],
            &params,
        )
        .unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::compare("age", Operator::Lte, "65"), default_sort()]
        );
    }
}
