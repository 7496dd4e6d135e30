//! # urlquery
//!
//! Turns the parameters of a list request into a query for a database
//! resource: exact matches, ranges, substring search, sorting, named scopes and
//! pagination, all validated against the resource's columns.
//!
//! ```rust,ignore
//! // GET /users?role_id=3&gte[age]=18&search=ann&order_by=name&order=desc&scopes[active]=1
//! let params = ParameterMap::from_query_str(uri.query().unwrap_or_default());
//! let page = urlquery::paginate_by_parameters::<Users>(&db, &params).await?;
//! ```
//!
//! ## Layers
//!
//! - [`QueryCompiler`] compiles a [`ParameterMap`] against a [`ResourceSchema`]
//!   into a [`QueryDescription`], an ordered list of [`Predicate`]s. It never
//!   touches a database and can be used with any [`ColumnListing`].
//! - [`QueryDescription::apply`] renders a description onto a sea-orm
//!   [`Select`](sea_orm::Select), running [`ScopeRegistry`] scopes.
//! - The [`operations`] helpers do both for a [`Resource`] and execute the
//!   result.
//!
//! ## Configuration
//!
//! [`QueryConfig`] controls strictness, range operators and which columns are
//! allowed. Set it process-wide with [`QueryConfig::set_global`] or pass one to
//! [`QueryCompiler::new`].

pub mod compiler;
pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod operations;
pub mod params;
pub mod predicate;
pub mod render;
pub mod schema;
pub mod scopes;

pub use compiler::{QueryCompiler, compile};
pub use config::{ColumnSource, QueryConfig};
pub use crate::core::Resource;
pub use errors::QueryError;
pub use filtering::{Page, PageRequest, SimplePage, calculate_content_range};
pub use models::ControlParameters;
pub use operations::{
    get_by_parameters, paginate_by_parameters, query_by_parameters, simple_paginate_by_parameters,
};
pub use params::ParameterMap;
pub use predicate::{Direction, Operator, Predicate, QueryDescription};
pub use schema::{ColumnListing, EntityColumns, ResourceDescriptor, ResourceSchema, TableCatalog};
pub use scopes::{ScopeLookup, ScopeRegistry};
pub use serde_with;
