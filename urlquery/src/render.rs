//! Applying a [`QueryDescription`] to a sea-orm [`Select`].
//!
//! Equality and range predicates are AND-ed together. A `Like` and the
//! `OrLike`s following it form one OR group, itself AND-ed with the rest, so
//! `?active=1&search=ann` means `active = 1 AND (id LIKE .. OR name LIKE ..)`.

use sea_orm::sea_query::{Alias, Expr, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ColumnTrait, ColumnType, Condition, EntityTrait, Order, QueryFilter, QueryOrder, Select,
    Value as DbValue,
};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::QueryError;
use crate::predicate::{Direction, Operator, Predicate, QueryDescription};
use crate::scopes::ScopeRegistry;

impl QueryDescription {
    /// Add this description's conditions, ordering and scopes to `select`.
    ///
    /// Values are bound according to the entity's column types where the
    /// column is known (`"18"` binds as an integer for an integer column).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownScope`] if a scope call names a scope that
    /// is not in `scopes`.
    pub fn apply<E: EntityTrait>(
        &self,
        select: Select<E>,
        scopes: &ScopeRegistry<Select<E>>,
    ) -> Result<Select<E>, QueryError> {
        let mut query = select;
        let mut condition = Condition::all();
        let mut filtered = false;
        let mut search: Option<Condition> = None;

        for predicate in self {
            match predicate {
                Predicate::Equals { column, value } => {
                    filtered = true;
                    condition = condition.add(column_expr(column).eq(bind::<E>(column, value)));
                }
                Predicate::Compare {
                    column,
                    operator,
                    value,
                } => {
                    filtered = true;
                    condition = condition.add(compare(column, *operator, bind::<E>(column, value)));
                }
                Predicate::Like { column, pattern } => {
                    filtered = true;
                    if let Some(group) = search.take() {
                        condition = condition.add(group);
                    }
                    search = Some(Condition::any().add(column_expr(column).like(pattern.as_str())));
                }
                Predicate::OrLike { column, pattern } => {
                    filtered = true;
                    let group = search.take().unwrap_or_else(Condition::any);
                    search = Some(group.add(column_expr(column).like(pattern.as_str())));
                }
                Predicate::OrderBy { column, direction } => {
                    let order = match direction {
                        Direction::Asc => Order::Asc,
                        Direction::Desc => Order::Desc,
                    };
                    query = query.order_by(SimpleExpr::Column(Alias::new(column).into_column_ref()), order);
                }
                Predicate::ScopeCall { scope, value } => {
                    query = scopes.apply(scope, query, value).map_err(|_| {
                        QueryError::unknown_scope(scope, E::default().table_name())
                    })?;
                }
            }
        }

        if let Some(group) = search {
            condition = condition.add(group);
        }
        if filtered {
            query = query.filter(condition);
        }
        Ok(query)
    }
}

fn column_expr(column: &str) -> Expr {
    Expr::col(Alias::new(column))
}

fn compare(column: &str, operator: Operator, value: DbValue) -> SimpleExpr {
    let column = column_expr(column);
    match operator {
        Operator::Lt => column.lt(value),
        Operator::Gt => column.gt(value),
        Operator::Lte => column.lte(value),
        Operator::Gte => column.gte(value),
    }
}

fn column_type<E: EntityTrait>(column: &str) -> Option<ColumnType> {
    <E::Column as FromStr>::from_str(column)
        .ok()
        .map(|column| column.def().get_column_type().clone())
}

fn bind<E: EntityTrait>(column: &str, value: &Value) -> DbValue {
    if let Value::String(raw) = value {
        if let Some(typed) = column_type::<E>(column).and_then(|ty| coerce_text(raw.trim(), &ty)) {
            return typed;
        }
    }
    untyped(value)
}

/// Bind a string parameter as the column's type. `None` when the string does
/// not fit the type or the type has no special handling.
fn coerce_text(raw: &str, column_type: &ColumnType) -> Option<DbValue> {
    match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned => raw.parse::<i64>().ok().map(DbValue::from),
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => {
            raw.parse::<f64>().ok().map(DbValue::from)
        }
        ColumnType::Boolean => match raw.to_lowercase().as_str() {
            "1" | "true" => Some(DbValue::from(true)),
            "0" | "false" => Some(DbValue::from(false)),
            _ => None,
        },
        ColumnType::Uuid => Uuid::parse_str(raw).ok().map(DbValue::from),
        ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_) => {
            Some(DbValue::from(raw.to_string()))
        }
        _ => None,
    }
}

fn untyped(value: &Value) -> DbValue {
    match value {
        Value::String(s) => Uuid::parse_str(s.trim())
            .map_or_else(|_| DbValue::from(s.clone()), DbValue::from),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DbValue::from(i)
            } else if let Some(u) = n.as_u64() {
                DbValue::from(u)
            } else {
                DbValue::from(n.as_f64().unwrap_or_default())
            }
        }
        Value::Bool(b) => DbValue::from(*b),
        Value::Null => DbValue::String(None),
        Value::Array(_) | Value::Object(_) => DbValue::from(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};
    use serde_json::json;

    mod post {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "posts")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub title: String,
            pub views: i32,
            pub published: bool,
            pub author_id: Uuid,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn render(description: &QueryDescription, scopes: &ScopeRegistry<Select<post::Entity>>) -> String {
        description
            .apply(post::Entity::find(), scopes)
            .unwrap()
            .build(DbBackend::Sqlite)
            .to_string()
    }

    fn description(predicates: Vec<Predicate>) -> QueryDescription {
        let mut description = QueryDescription::new();
        for predicate in predicates {
            description.push(predicate);
        }
        description
    }

    #[test]
    fn test_search_group_is_or_within_and() {
        let sql = render(
            &description(vec![
                Predicate::equals("published", "1"),
                Predicate::like("id", "%rust%"),
                Predicate::or_like("title", "%rust%"),
                Predicate::order_by("id", Direction::Desc),
            ]),
            &ScopeRegistry::new(),
        );
        assert!(sql.contains(r#"WHERE "published" = "#), "{sql}");
        assert!(
            sql.contains(r#" AND ("id" LIKE '%rust%' OR "title" LIKE '%rust%')"#),
            "{sql}"
        );
        assert!(sql.ends_with(r#"ORDER BY "id" DESC"#), "{sql}");
    }

    #[test]
    fn test_range_binds_column_type() {
        let sql = render(
            &description(vec![
                Predicate::compare("views", Operator::Gte, "10"),
                Predicate::compare("views", Operator::Lt, 100),
            ]),
            &ScopeRegistry::new(),
        );
        assert!(sql.contains(r#""views" >= 10 AND "views" < 100"#), "{sql}");
    }

    #[test]
    fn test_text_column_keeps_string() {
        let sql = render(
            &description(vec![Predicate::equals("title", "42")]),
            &ScopeRegistry::new(),
        );
        assert!(sql.contains(r#""title" = '42'"#), "{sql}");
    }

    #[test]
    fn test_scope_call() {
        let scopes = ScopeRegistry::new().register("popular", |query: Select<post::Entity>, value: &Value| {
            let min = value.as_str().and_then(|v| v.parse::<i32>().ok()).unwrap_or(1000);
            query.filter(post::Column::Views.gte(min))
        });
        let sql = render(&description(vec![Predicate::scope("popular", "500")]), &scopes);
        assert!(sql.contains(r#""posts"."views" >= 500"#), "{sql}");
    }

    #[test]
    fn test_missing_scope_at_apply_time() {
        let err = description(vec![Predicate::scope("popular", json!(1))])
            .apply(post::Entity::find(), &ScopeRegistry::new())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownScope { ref scope, ref resource } if scope == "popular" && resource == "posts"));
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text("12", &ColumnType::Integer), Some(DbValue::from(12_i64)));
        assert_eq!(coerce_text("12abc", &ColumnType::Integer), None);
        assert_eq!(coerce_text("TRUE", &ColumnType::Boolean), Some(DbValue::from(true)));
        assert_eq!(coerce_text("maybe", &ColumnType::Boolean), None);
        assert_eq!(coerce_text("not-a-uuid", &ColumnType::Uuid), None);
    }

    #[test]
    fn test_untyped_uuid_detection() {
        let id = Uuid::new_v4();
        assert_eq!(untyped(&json!(id.to_string())), DbValue::from(id));
        assert_eq!(untyped(&json!("plain")), DbValue::from("plain".to_string()));
        assert_eq!(untyped(&json!(2.5)), DbValue::from(2.5_f64));
    }
}
