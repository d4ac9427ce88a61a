//! Ordered route table.
//!
//! This module provides [`RouteTable`], the registered set of
//! pattern → library-scope pairs consulted for every request.

use std::fmt;

use crate::error::PatternError;
use crate::pattern::RoutePattern;

/// Which library namespace a route resolves assets in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LibraryScope {
    /// Resolve across all libraries.
    Any,
    /// Resolve only inside the named library.
    Library(String),
}

impl LibraryScope {
    /// Parse a scope identifier. `""` and `"*"` mean [`LibraryScope::Any`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use webjars_router::LibraryScope;
    ///
    /// assert_eq!(LibraryScope::parse("*").unwrap(), LibraryScope::Any);
    /// assert_eq!(LibraryScope::parse("jquery").unwrap().library(), Some("jquery"));
    /// assert!(LibraryScope::parse("jquery/ui").is_err());
    /// ```
    pub fn parse(scope: &str) -> Result<Self, PatternError> {
        let scope = scope.trim();
        match scope {
            "" | "*" => Ok(Self::Any),
            s if s.contains('/') => Err(PatternError::invalid_scope(s)),
            s => Ok(Self::Library(s.to_string())),
        }
    }

    /// The library name, if scoped.
    pub fn library(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Library(name) => Some(name),
        }
    }
}

impl fmt::Display for LibraryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Library(name) => f.write_str(name),
        }
    }
}

/// A compiled pattern and the scope it resolves in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pattern: RoutePattern,
    scope: LibraryScope,
}

impl Route {
    /// The compiled pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The library scope.
    pub fn scope(&self) -> &LibraryScope {
        &self.scope
    }
}

/// A matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The pattern text that matched.
    pub pattern: &'a str,
    /// The scope the asset is resolved in.
    pub scope: &'a LibraryScope,
}

/// An ordered set of routes. The first registered route that matches wins.
///
/// Routes are registered once at startup; the table is read-only afterwards
/// and can be shared between threads without synchronization.
///
/// # Example
///
/// ```rust
/// use webjars_router::{LibraryScope, RouteTable};
///
/// let mut table = RouteTable::new();
/// table.insert("/webjars/jquery/**", LibraryScope::parse("jquery").unwrap()).unwrap();
/// table.insert("/webjars/**", LibraryScope::Any).unwrap();
///
/// let m = table.match_path("/webjars/jquery/jquery.min.js").unwrap();
/// assert_eq!(m.scope.library(), Some("jquery"));
///
/// let m = table.match_path("/webjars/bootstrap/css/bootstrap.css").unwrap();
/// assert_eq!(m.scope, &LibraryScope::Any);
///
/// assert!(table.match_path("/api/users").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(pattern, scope)` pairs in iteration order.
    ///
    /// Fails on the first malformed pattern or scope.
    pub fn from_pairs<I, P, S>(pairs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<str>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (pattern, scope) in pairs {
            table.insert(pattern.as_ref(), LibraryScope::parse(scope.as_ref())?)?;
        }
        Ok(table)
    }

    /// Appends a route.
    pub fn insert(&mut self, pattern: &str, scope: LibraryScope) -> Result<(), PatternError> {
        let pattern = RoutePattern::parse(pattern)?;
        self.routes.push(Route { pattern, scope });
        Ok(())
    }

    /// Returns the first route whose pattern matches `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .find(|route| route.pattern.matches(path))
            .map(|route| RouteMatch {
                pattern: route.pattern.as_str(),
                scope: &route.scope,
            })
    }

    /// Iterates routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
