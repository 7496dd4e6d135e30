//! # Parameter Query Compiler
//!
//! Turns a [`ParameterMap`] into a [`QueryDescription`] for one resource.
//!
//! Stages run in a fixed order, each appending to the description:
//!
//! 1. exact matches (`?name=Ann`)
//! 2. ranges (`?gte[age]=18&lte[age]=65`), when range operators are enabled
//! 3. search (`?search=ann`, `?search=ann&search_by=email`)
//! 4. sort (`?order_by=name&order=desc`, default `created_at asc`)
//! 5. scopes (`?scopes[active]=1`)
//!
//! All per-request state lives in a `CompileContext` owned by a single
//! `compile` call, so one compiler can serve concurrent requests.
//!
//! ```rust,ignore
//! let schema = ResourceSchema::introspect(&catalog, &ResourceDescriptor::new("users"))?;
//! let params = ParameterMap::from_query_str("name=Ann&order_by=email&order=desc");
//! let description = QueryCompiler::from_global().compile(&schema, &scopes, &params)?;
//! ```

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::filtering::{conditions, search, sort};
use crate::params::ParameterMap;
use crate::predicate::{Predicate, QueryDescription};
use crate::schema::{ColumnListing, ResourceDescriptor, ResourceSchema};
use crate::scopes::ScopeLookup;

/// State of one compile call.
pub(crate) struct CompileContext<'a> {
    pub config: &'a QueryConfig,
    pub params: &'a ParameterMap,
    pub schema: &'a ResourceSchema,
    /// Allow-list for this compile (queryable or searchable columns)
    pub columns: Vec<String>,
    pub description: QueryDescription,
}

impl CompileContext<'_> {
    pub fn allows(&self, column: &str) -> bool {
        self.columns.iter().any(|allowed| allowed == column)
    }

    /// Swallow a suppressible error in lenient mode, return it in strict mode.
    pub fn reject(&self, error: QueryError) -> Result<(), QueryError> {
        if self.config.ignore_invalid_parameters && error.is_suppressible() {
            tracing::debug!(table = %self.schema.table, %error, "Skipping invalid parameter");
            Ok(())
        } else {
            Err(error)
        }
    }

    /// `Ok(true)` if `column` is allowed, `Ok(false)` if it should be skipped.
    pub fn check_column(&self, column: &str) -> Result<bool, QueryError> {
        if self.allows(column) {
            return Ok(true);
        }
        self.reject(QueryError::invalid_parameter(column))?;
        Ok(false)
    }

    /// Like [`check_column`](Self::check_column), but only enforced when
    /// `validate_all_columns` is on. Used for range columns, `search_by` and
    /// `order_by`.
    pub fn check_extra_column(&self, column: &str) -> Result<bool, QueryError> {
        if self.config.validate_all_columns {
            self.check_column(column)
        } else {
            Ok(true)
        }
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.description.push(predicate);
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    config: QueryConfig,
}

impl QueryCompiler {
    #[must_use]
    pub const fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Compiler using a snapshot of the process-wide configuration.
    #[must_use]
    pub fn from_global() -> Self {
        Self::new(QueryConfig::global())
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Compile `params` against `schema`.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Schema`] when the schema has no usable column, whatever the
    ///   strictness mode.
    /// - [`QueryError::InvalidParameter`] / [`QueryError::UnknownScope`] in strict
    ///   mode only.
    pub fn compile<S>(
        &self,
        schema: &ResourceSchema,
        scopes: &S,
        params: &ParameterMap,
    ) -> Result<QueryDescription, QueryError>
    where
        S: ScopeLookup + ?Sized,
    {
        let columns = schema.columns_for(self.config.column_source);
        if columns.is_empty() {
            return Err(QueryError::schema(format!(
                "Resource \"{}\" requires at least one search column. 0 given.",
                schema.table
            )));
        }

        let mut ctx = CompileContext {
            config: &self.config,
            params,
            schema,
            columns,
            description: QueryDescription::new(),
        };

        conditions::build_exact_matches(&mut ctx)?;
        if self.config.range_operators {
            conditions::build_ranges(&mut ctx)?;
        }
        search::build_search(&mut ctx)?;
        sort::build_sort(&mut ctx)?;
        build_scopes(&mut ctx, scopes)?;

        tracing::debug!(
            table = %schema.table,
            predicates = ctx.description.len(),
            "Compiled query parameters"
        );
        Ok(ctx.description)
    }

    /// Introspect the resource, then [`compile`](Self::compile).
    ///
    /// # Errors
    ///
    /// Schema introspection errors, plus everything [`compile`](Self::compile)
    /// returns.
    pub fn compile_resource<L, S>(
        &self,
        listing: &L,
        descriptor: &ResourceDescriptor,
        scopes: &S,
        params: &ParameterMap,
    ) -> Result<QueryDescription, QueryError>
    where
        L: ColumnListing,
        S: ScopeLookup + ?Sized,
    {
        let schema = ResourceSchema::introspect(listing, descriptor)?;
        self.compile(&schema, scopes, params)
    }
}

/// Compile with the process-wide configuration.
///
/// # Errors
///
/// See [`QueryCompiler::compile`].
pub fn compile<S>(
    schema: &ResourceSchema,
    scopes: &S,
    params: &ParameterMap,
) -> Result<QueryDescription, QueryError>
where
    S: ScopeLookup + ?Sized,
{
    QueryCompiler::from_global().compile(schema, scopes, params)
}

fn build_scopes<S>(ctx: &mut CompileContext<'_>, scopes: &S) -> Result<(), QueryError>
where
    S: ScopeLookup + ?Sized,
{
    let params = ctx.params;
    let Some(requested) = params.map("scopes") else {
        return Ok(());
    };

    for (name, value) in requested {
        if !crate::params::is_filled(value) {
            continue;
        }
        if scopes.has_scope(name) {
            ctx.push(Predicate::scope(name.as_str(), value.clone()));
        } else {
            ctx.reject(QueryError::unknown_scope(name.as_str(), ctx.schema.table.as_str()))?;
        }
    }
    Ok(())
}
