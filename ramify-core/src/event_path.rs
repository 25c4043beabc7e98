//! Addresses accepted by events and subscriptions.

use crate::{error::PathError, path::Path, query::Query};
use std::{fmt, str::FromStr};

/// Where an event is targeted or a hook is subscribed.
///
/// Concrete paths bubble; queries are dispatched once, at the query itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPath {
    /// A concrete path.
    Path(Path),
    /// A pattern.
    Query(Query),
}

impl EventPath {
    /// Parses text, yielding [`EventPath::Path`] when every segment is literal.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let query = Query::parse(text)?;
        if query.is_pattern() {
            Ok(EventPath::Query(query))
        } else {
            Ok(EventPath::Path(query.stem_path()))
        }
    }

    /// The root path.
    pub const fn root() -> Self {
        EventPath::Path(Path::root())
    }

    /// Whether this is a query.
    pub fn is_query(&self) -> bool {
        matches!(self, EventPath::Query(_))
    }

    /// The concrete path, if this is one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            EventPath::Path(path) => Some(path),
            EventPath::Query(_) => None,
        }
    }

    /// The query, if this is one.
    pub fn as_query(&self) -> Option<&Query> {
        match self {
            EventPath::Path(_) => None,
            EventPath::Query(query) => Some(query),
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        match self {
            EventPath::Path(path) => path.len(),
            EventPath::Query(query) => query.len(),
        }
    }

    /// Whether there are no segments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The concrete part: the path itself, or the literal stem of a query.
    pub fn stem(&self) -> Path {
        match self {
            EventPath::Path(path) => path.clone(),
            EventPath::Query(query) => query.stem_path(),
        }
    }

    /// Whether `path` falls inside the subtree this address designates.
    pub fn contains_path(&self, path: &Path) -> bool {
        match self {
            EventPath::Path(root) => root.is_ancestor_of(path),
            EventPath::Query(query) => query.matches_prefix_of(path),
        }
    }

    /// Subtree relation between two addresses (non-strict).
    ///
    /// A query is only known to lie under a path through its literal stem, and
    /// two queries are only related when equal.
    pub fn is_root_of(&self, other: &EventPath) -> bool {
        match other {
            EventPath::Path(path) => self.contains_path(path),
            EventPath::Query(query) => match self {
                EventPath::Path(root) => root.is_ancestor_of(&query.stem_path()),
                EventPath::Query(own) => own == query,
            },
        }
    }
}

impl Default for EventPath {
    fn default() -> Self {
        Self::root()
    }
}

impl From<Path> for EventPath {
    fn from(path: Path) -> Self {
        EventPath::Path(path)
    }
}

impl From<&Path> for EventPath {
    fn from(path: &Path) -> Self {
        EventPath::Path(path.clone())
    }
}

impl From<Query> for EventPath {
    fn from(query: Query) -> Self {
        EventPath::Query(query)
    }
}

impl From<&EventPath> for EventPath {
    fn from(path: &EventPath) -> Self {
        path.clone()
    }
}

impl fmt::Display for EventPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPath::Path(path) => fmt::Display::fmt(path, f),
            EventPath::Query(query) => fmt::Display::fmt(query, f),
        }
    }
}

impl FromStr for EventPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for EventPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
