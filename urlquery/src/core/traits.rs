use sea_orm::{EntityName, EntityTrait, Select};

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::schema::{EntityColumns, ResourceDescriptor, ResourceSchema};
use crate::scopes::ScopeRegistry;

/// A sea-orm entity exposed to parameter queries.
///
/// Only the entity type is required; everything else has a default.
///
/// ```rust,ignore
/// pub struct Users;
///
/// impl Resource for Users {
///     type EntityType = user::Entity;
///     const PER_PAGE: Option<u64> = Some(25);
///
///     fn fillable_columns() -> Vec<&'static str> {
///         vec!["name", "email", "password"]
///     }
///
///     fn hidden_columns() -> Vec<&'static str> {
///         vec!["password"]
///     }
///
///     fn scopes() -> ScopeRegistry<Select<user::Entity>> {
///         ScopeRegistry::new().register("active", |query, _| {
///             query.filter(user::Column::Active.eq(true))
///         })
///     }
/// }
/// ```
pub trait Resource {
    type EntityType: EntityTrait;

    const ID_COLUMN: &'static str = "id";
    /// Page size for this resource; `None` uses the configured default.
    const PER_PAGE: Option<u64> = None;

    #[must_use]
    fn table_name() -> String {
        Self::EntityType::default().table_name().to_string()
    }

    #[must_use]
    fn fillable_columns() -> Vec<&'static str> {
        vec![]
    }

    /// Columns that can never be filtered, searched or sorted on.
    #[must_use]
    fn hidden_columns() -> Vec<&'static str> {
        vec![]
    }

    #[must_use]
    fn scopes() -> ScopeRegistry<Select<Self::EntityType>> {
        ScopeRegistry::new()
    }

    #[must_use]
    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new(Self::table_name())
            .id_column(Self::ID_COLUMN)
            .fillable(Self::fillable_columns())
            .hidden(Self::hidden_columns())
    }

    /// Introspect the entity's columns.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Schema`] if the entity's columns cannot be listed.
    fn schema() -> Result<ResourceSchema, QueryError> {
        ResourceSchema::introspect(&EntityColumns::<Self::EntityType>::new(), &Self::descriptor())
    }

    #[must_use]
    fn per_page(config: &QueryConfig) -> u64 {
        Self::PER_PAGE.unwrap_or(config.default_per_page).max(1)
    }
}
