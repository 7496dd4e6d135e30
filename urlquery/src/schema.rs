//! Resource schema introspection.
//!
//! A [`ResourceSchema`] is built once per compile from a [`ResourceDescriptor`]
//! (what the resource declares about itself) and a [`ColumnListing`] (what the
//! storage layer says the table actually has). The schema then yields the
//! allow-list of columns that parameters may reference.

use sea_orm::{EntityTrait, IdenStatic, Iterable};
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;

use crate::config::ColumnSource;
use crate::errors::QueryError;

/// Source of a table's column names.
pub trait ColumnListing {
    /// Column names of `table`, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Schema`] if the table is unknown.
    fn column_listing(&self, table: &str) -> Result<Vec<String>, QueryError>;
}

/// What a resource declares about its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub table: String,
    pub id_column: String,
    /// Writable (and, in searchable mode, searchable) columns
    pub fillable: Vec<String>,
    /// Columns that must never be filtered, searched or exposed
    pub hidden: Vec<String>,
}

impl ResourceDescriptor {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: "id".to_string(),
            fillable: Vec::new(),
            hidden: Vec::new(),
        }
    }

    #[must_use]
    pub fn id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    #[must_use]
    pub fn fillable<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fillable = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn hidden<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = columns.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    pub table: String,
    pub id_column: String,
    pub all_columns: Vec<String>,
    pub fillable_columns: Vec<String>,
    pub hidden_columns: BTreeSet<String>,
}

impl ResourceSchema {
    /// Combine a descriptor with the table's actual column listing.
    ///
    /// # Errors
    ///
    /// Propagates the listing's [`QueryError::Schema`] when the table is unknown.
    pub fn introspect(
        listing: &impl ColumnListing,
        descriptor: &ResourceDescriptor,
    ) -> Result<Self, QueryError> {
        let all_columns = listing.column_listing(&descriptor.table)?;
        Ok(Self {
            table: descriptor.table.clone(),
            id_column: descriptor.id_column.clone(),
            all_columns,
            fillable_columns: descriptor.fillable.clone(),
            hidden_columns: descriptor.hidden.iter().cloned().collect(),
        })
    }

    /// All columns minus the hidden ones, in table order.
    #[must_use]
    pub fn queryable_columns(&self) -> Vec<String> {
        self.all_columns
            .iter()
            .filter(|column| !self.hidden_columns.contains(*column))
            .cloned()
            .collect()
    }

    /// The id column followed by the fillable columns, minus the hidden ones.
    #[must_use]
    pub fn search_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::with_capacity(self.fillable_columns.len() + 1);
        for column in std::iter::once(&self.id_column).chain(&self.fillable_columns) {
            if !self.hidden_columns.contains(column) && !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }

    #[must_use]
    pub fn columns_for(&self, source: ColumnSource) -> Vec<String> {
        match source {
            ColumnSource::Queryable => self.queryable_columns(),
            ColumnSource::Searchable => self.search_columns(),
        }
    }
}

/// In-memory table catalog, for resources that are not sea-orm entities.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    tables: HashMap<String, Vec<String>>,
}

impl TableCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(name.into(), columns.into_iter().map(Into::into).collect());
        self
    }
}

impl ColumnListing for TableCatalog {
    fn column_listing(&self, table: &str) -> Result<Vec<String>, QueryError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| QueryError::schema(format!("Unknown table \"{table}\"")))
    }
}

/// Columns of a sea-orm entity, read from its `Column` enum.
pub struct EntityColumns<E>(PhantomData<E>);

impl<E> EntityColumns<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EntityColumns<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> ColumnListing for EntityColumns<E> {
    fn column_listing(&self, table: &str) -> Result<Vec<String>, QueryError> {
        let entity = E::default();
        if entity.table_name() != table {
            return Err(QueryError::schema(format!(
                "Unknown table \"{table}\" (entity maps to \"{}\")",
                entity.table_name()
            )));
        }
        Ok(E::Column::iter()
            .map(|column| column.as_str().to_string())
            .collect())
    }
}
