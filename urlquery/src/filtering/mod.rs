//! # Filtering, Search & Sorting Stages
//!
//! The building blocks the [`QueryCompiler`](crate::QueryCompiler) runs, in
//! order, for every request. Each stage reads the request's parameters and
//! appends predicates to the description being built.
//!
//! ## Query Parameter Examples
//!
//! ### Exact Matches
//! ```rust,ignore
//! // Any non-reserved parameter naming a queryable column
//! GET /users?name=Ann&role_id=3
//! ```
//!
//! ### Ranges
//! ```rust,ignore
//! // lt, gt, lte, gte, plus min (= gte) and max (= lte)
//! GET /users?gte[age]=18&lte[age]=65
//! GET /users?min[created_at]=2024-01-01
//! ```
//!
//! ### Search
//! ```rust,ignore
//! // Substring match over every queryable column, OR-ed together
//! GET /users?search=ann
//!
//! // Single column
//! GET /users?search=ann&search_by=email
//! ```
//!
//! ### Sorting
//! ```rust,ignore
//! // Defaults to created_at asc
//! GET /users?order_by=name&order=desc
//! ```
//!
//! ### Pagination
//! ```rust,ignore
//! GET /users?page=2&per_page=25
//! ```

pub mod conditions;
pub mod pagination;
pub mod search;
pub mod sort;

pub use pagination::{Page, PageRequest, SimplePage, calculate_content_range};
pub use search::contains_pattern;
