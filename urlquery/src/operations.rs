//! # Running Compiled Queries
//!
//! Entry points that compile a request's parameters for a [`Resource`] and
//! apply the result to a sea-orm select, optionally executing it.
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(db): State<DatabaseConnection>,
//!     params: ParameterMap,
//! ) -> Result<Json<Page<user::Model>>, QueryError> {
//!     Ok(Json(urlquery::paginate_by_parameters::<Users>(&db, &params).await?))
//! }
//! ```
//!
//! The free functions use the process-wide [`QueryConfig`](crate::QueryConfig);
//! the methods on [`QueryCompiler`] use the compiler's own.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QuerySelect, Select};

use crate::compiler::QueryCompiler;
use crate::core::Resource;
use crate::errors::QueryError;
use crate::filtering::pagination::{Page, PageRequest, SimplePage};
use crate::models::ControlParameters;
use crate::params::ParameterMap;

type ModelOf<R> = <<R as Resource>::EntityType as EntityTrait>::Model;

impl QueryCompiler {
    /// Compile `params` for `R` into an unexecuted select.
    ///
    /// # Errors
    ///
    /// Everything [`QueryCompiler::compile`] returns, plus
    /// [`QueryError::UnknownScope`] if `R::scopes()` cannot run a compiled scope
    /// call.
    pub fn query_by_parameters<R: Resource>(
        &self,
        params: &ParameterMap,
    ) -> Result<Select<R::EntityType>, QueryError> {
        let schema = R::schema()?;
        let scopes = R::scopes();
        let description = self.compile(&schema, &scopes, params)?;
        description.apply(R::EntityType::find(), &scopes)
    }

    /// All rows matching `params`.
    ///
    /// # Errors
    ///
    /// Compile errors, or [`QueryError::Database`] if the query fails.
    pub async fn get_by_parameters<R: Resource>(
        &self,
        db: &DatabaseConnection,
        params: &ParameterMap,
    ) -> Result<Vec<ModelOf<R>>, QueryError> {
        let select = self.query_by_parameters::<R>(params)?;
        Ok(select.all(db).await?)
    }

    /// The page of rows selected by `page` and `per_page`, with totals.
    ///
    /// # Errors
    ///
    /// Compile errors, or [`QueryError::Database`] if either the count or the
    /// page query fails.
    pub async fn paginate_by_parameters<R: Resource>(
        &self,
        db: &DatabaseConnection,
        params: &ParameterMap,
    ) -> Result<Page<ModelOf<R>>, QueryError>
    where
        ModelOf<R>: Sync,
    {
        let request = self.page_request::<R>(params);
        let paginator = self
            .query_by_parameters::<R>(params)?
            .paginate(db, request.per_page);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(request.index()).await?;
        tracing::debug!(
            table = %R::table_name(),
            page = request.page,
            total,
            "Fetched page"
        );
        Ok(Page::new(data, total, request))
    }

    /// Like [`paginate_by_parameters`](Self::paginate_by_parameters) but
    /// without the count query. Fetches one extra row to tell whether another
    /// page follows.
    ///
    /// # Errors
    ///
    /// Compile errors, or [`QueryError::Database`] if the query fails.
    pub async fn simple_paginate_by_parameters<R: Resource>(
        &self,
        db: &DatabaseConnection,
        params: &ParameterMap,
    ) -> Result<SimplePage<ModelOf<R>>, QueryError> {
        let request = self.page_request::<R>(params);
        let mut data = self
            .query_by_parameters::<R>(params)?
            .offset(request.offset())
            .limit(request.per_page.saturating_add(1))
            .all(db)
            .await?;

        let per_page = usize::try_from(request.per_page).unwrap_or(usize::MAX);
        let has_more = data.len() > per_page;
        data.truncate(per_page);

        Ok(SimplePage {
            data,
            per_page: request.per_page,
            current_page: request.page,
            has_more,
        })
    }

    fn page_request<R: Resource>(&self, params: &ParameterMap) -> PageRequest {
        let control = ControlParameters::from_params(params);
        PageRequest::from_control(&control, R::per_page(self.config()))
    }
}

/// Compile `params` for `R` with the process-wide configuration.
///
/// # Errors
///
/// See [`QueryCompiler::query_by_parameters`].
pub fn query_by_parameters<R: Resource>(
    params: &ParameterMap,
) -> Result<Select<R::EntityType>, QueryError> {
    QueryCompiler::from_global().query_by_parameters::<R>(params)
}

/// # Errors
///
/// See [`QueryCompiler::get_by_parameters`].
pub async fn get_by_parameters<R: Resource>(
    db: &DatabaseConnection,
    params: &ParameterMap,
) -> Result<Vec<ModelOf<R>>, QueryError> {
    QueryCompiler::from_global().get_by_parameters::<R>(db, params).await
}

/// # Errors
///
/// See [`QueryCompiler::paginate_by_parameters`].
pub async fn paginate_by_parameters<R: Resource>(
    db: &DatabaseConnection,
    params: &ParameterMap,
) -> Result<Page<ModelOf<R>>, QueryError>
where
    ModelOf<R>: Sync,
{
    QueryCompiler::from_global()
        .paginate_by_parameters::<R>(db, params)
        .await
}

/// # Errors
///
/// See [`QueryCompiler::simple_paginate_by_parameters`].
pub async fn simple_paginate_by_parameters<R: Resource>(
    db: &DatabaseConnection,
    params: &ParameterMap,
) -> Result<SimplePage<ModelOf<R>>, QueryError> {
    QueryCompiler::from_global()
        .simple_paginate_by_parameters::<R>(db, params)
        .await
}
