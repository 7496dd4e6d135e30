use sea_orm::entity::prelude::*;
use serde::Serialize;
use urlquery::{Resource, ScopeRegistry};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub age: i32,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub struct Users;

impl Resource for Users {
    type EntityType = Entity;

    fn fillable_columns() -> Vec<&'static str> {
        vec!["name", "email", "password", "age"]
    }

    fn hidden_columns() -> Vec<&'static str> {
        vec!["password"]
    }

    fn scopes() -> ScopeRegistry<Select<Entity>> {
        ScopeRegistry::new()
            .register("active", |query: Select<Entity>, value: &serde_json::Value| {
                let active = !matches!(value.as_str(), Some("0" | "false"));
                query.filter(Column::Active.eq(active))
            })
            .register("older_than", |query: Select<Entity>, value: &serde_json::Value| {
                match value.as_str().and_then(|v| v.parse::<i32>().ok()) {
                    Some(age) => query.filter(Column::Age.gt(age)),
                    None => query,
                }
            })
    }
}

/// Same table, but a page size of its own and no scopes.
pub struct CompactUsers;

impl Resource for CompactUsers {
    type EntityType = Entity;
    const PER_PAGE: Option<u64> = Some(2);
}
