//! Named query scopes.
//!
//! A scope is a reusable transformation registered under a name and invoked by
//! `?scopes[name]=value`. The compiler only needs to know whether a name is
//! registered ([`ScopeLookup`]); the transformation runs when the compiled
//! description is applied to a query.
//!
//! ```rust,ignore
//! let scopes = ScopeRegistry::<Select<user::Entity>>::new()
//!     .register("active", |query, value| {
//!         query.filter(user::Column::Active.eq(value.as_str() != Some("0")))
//!     })
//!     .register("older_than", |query, value| match value.as_str().and_then(|v| v.parse::<i32>().ok()) {
//!         Some(age) => query.filter(user::Column::Age.gt(age)),
//!         None => query,
//!     });
//! ```

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type ScopeFn<Q> = Arc<dyn Fn(Q, &Value) -> Q + Send + Sync>;

/// Name-based presence check used while compiling.
pub trait ScopeLookup {
    fn has_scope(&self, name: &str) -> bool;
}

/// Registry of scope transformations over query type `Q`.
pub struct ScopeRegistry<Q> {
    scopes: BTreeMap<String, ScopeFn<Q>>,
}

impl<Q> ScopeRegistry<Q> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: BTreeMap::new(),
        }
    }

    /// Register (or replace) the scope `name`.
    #[must_use]
    pub fn register<F>(mut self, name: impl Into<String>, scope: F) -> Self
    where
        F: Fn(Q, &Value) -> Q + Send + Sync + 'static,
    {
        self.scopes.insert(name.into(), Arc::new(scope));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    /// Run the scope `name` on `query`. Returns the query untouched in `Err`
    /// when no such scope is registered.
    ///
    /// # Errors
    ///
    /// Gives `query` back if `name` is not registered.
    pub fn apply(&self, name: &str, query: Q, value: &Value) -> Result<Q, Q> {
        match self.scopes.get(name) {
            Some(scope) => Ok(scope(query, value)),
            None => Err(query),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl<Q> Default for ScopeRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> Clone for ScopeRegistry<Q> {
    fn clone(&self) -> Self {
        Self {
            scopes: self.scopes.clone(),
        }
    }
}

impl<Q> fmt::Debug for ScopeRegistry<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.scopes.keys()).finish()
    }
}

impl<Q> ScopeLookup for ScopeRegistry<Q> {
    fn has_scope(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Names only, for compiling without transformations at hand.
impl ScopeLookup for [&str] {
    fn has_scope(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

impl<const N: usize> ScopeLookup for [&str; N] {
    fn has_scope(&self, name: &str) -> bool {
        self.contains(&name)
    }
}
