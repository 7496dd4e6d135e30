//! # Query Errors
//!
//! Every failure the compiler or the execution helpers can produce is a
//! [`QueryError`]. Compilation is all-or-nothing: a fatal error never comes with a
//! partial query.
//!
//! | Variant | Raised when | Suppressed by lenient mode | HTTP status |
//! |---|---|---|---|
//! | `Schema` | no queryable columns, unknown table | never | 500 |
//! | `InvalidParameter` | a parameter names a column outside the allow-list | yes | 400 |
//! | `UnknownScope` | a requested scope is not registered | yes | 400 |
//! | `Database` | executing the compiled query failed | n/a | 500 |
//!
//! Handlers can return `Result<_, QueryError>` directly:
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(db): State<DatabaseConnection>,
//!     params: ParameterMap,
//! ) -> Result<Json<Page<user::Model>>, QueryError> {
//!     Ok(Json(paginate_by_parameters::<User>(&db, &params).await?))
//! }
//! ```
//!
//! Internal details (database errors, schema problems) are logged through
//! `tracing` and never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Error raised while compiling or executing a parameter query.
#[derive(Debug)]
pub enum QueryError {
    /// The resource cannot be queried at all: its column listing is unavailable
    /// or no column survives the hidden-column filter.
    Schema {
        /// Description of the schema problem
        message: String,
    },

    /// A request parameter refers to a column that is not in the allow-list.
    InvalidParameter {
        /// The offending parameter (or column) name
        parameter: String,
    },

    /// A requested scope has no registered transformation.
    UnknownScope {
        /// Requested scope name
        scope: String,
        /// Table of the resource the scope was requested on
        resource: String,
    },

    /// Executing the compiled query failed (details logged, not exposed)
    Database {
        /// Internal error
        internal: DbErr,
    },
}

impl QueryError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
        }
    }

    /// Create an unknown scope error
    pub fn unknown_scope(scope: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::UnknownScope {
            scope: scope.into(),
            resource: resource.into(),
        }
    }

    /// Whether lenient mode is allowed to swallow this error.
    #[must_use]
    pub const fn is_suppressible(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. } | Self::UnknownScope { .. })
    }

    /// HTTP status code a handler should answer with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } | Self::UnknownScope { .. } => StatusCode::BAD_REQUEST,
            Self::Schema { .. } | Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to send to a client
    fn user_message(&self) -> String {
        match self {
            Self::InvalidParameter { .. } | Self::UnknownScope { .. } => self.to_string(),
            Self::Schema { .. } => "The resource cannot be queried".to_string(),
            Self::Database { .. } => "A database error occurred".to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error while executing query");
            }
            Self::Schema { message } => {
                tracing::error!(details = %message, "Resource schema error");
            }
            _ => {
                tracing::debug!(
                    error = %self,
                    status = %self.status_code(),
                    "Rejected query parameters"
                );
            }
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { message } => write!(f, "{message}"),
            Self::InvalidParameter { parameter } => {
                write!(f, "Invalid parameter \"{parameter}\" received.")
            }
            Self::UnknownScope { scope, resource } => {
                write!(f, "The scope \"{scope}\" does not exist in {resource}.")
            }
            Self::Database { internal } => write!(f, "Database error: {internal}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal } => Some(internal),
            _ => None,
        }
    }
}

impl From<DbErr> for QueryError {
    fn from(internal: DbErr) -> Self {
        Self::Database { internal }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body = ErrorResponse {
            error: self.user_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
