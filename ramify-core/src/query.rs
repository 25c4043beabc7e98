//! Path patterns.
//!
//! A [`Query`] is a path whose segments may be patterns:
//!
//! | text      | segment                     | matches                       |
//! |-----------|-----------------------------|-------------------------------|
//! | `foo`     | [`QuerySegment::Literal`]   | exactly `foo`                 |
//! | `foo<bar` | [`QuerySegment::Choice`]    | `foo` or `bar`                |
//! | `\|`      | [`QuerySegment::Wildcard`]  | any single segment            |
//! | `\`       | [`QuerySegment::Skip`]      | zero or more segments         |
//!
//! ```rust
//! use ramify_core::{Path, Query};
//!
//! let query: Query = r"a>\>b".parse().unwrap();
//! assert!(query.matches_path(&Path::parse("a>x>y>b").unwrap()));
//! assert!(!query.matches_path(&Path::parse("a>b>c").unwrap()));
//! ```

use crate::{
    error::PathError,
    path::{Path, SEPARATOR, decode_segment, encode_segment},
};
use std::{fmt, str::FromStr};

/// Text form of [`QuerySegment::Wildcard`].
pub const WILDCARD: &str = "|";

/// Text form of [`QuerySegment::Skip`].
pub const SKIP: &str = "\\";

/// Separator between alternatives of a [`QuerySegment::Choice`].
pub const CHOICE_SEPARATOR: char = '<';

/// One segment of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuerySegment {
    /// Matches one segment equal to the string.
    Literal(String),
    /// Matches one segment equal to any alternative.
    Choice(Vec<String>),
    /// Matches any one segment.
    Wildcard,
    /// Matches zero or more consecutive segments.
    Skip,
}

impl QuerySegment {
    /// Whether this segment accepts a single path segment.
    ///
    /// `Skip` accepts anything; its run length is decided by [`Query`].
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            QuerySegment::Literal(literal) => literal == segment,
            QuerySegment::Choice(choices) => choices.iter().any(|c| c == segment),
            QuerySegment::Wildcard | QuerySegment::Skip => true,
        }
    }

    /// Whether this is anything but a literal.
    pub fn is_pattern(&self) -> bool {
        !matches!(self, QuerySegment::Literal(_))
    }

    fn parse(raw: &str, position: usize) -> Result<Self, PathError> {
        match raw {
            "" => Err(PathError::EmptySegment { position }),
            WILDCARD => Ok(QuerySegment::Wildcard),
            SKIP => Ok(QuerySegment::Skip),
            _ if raw.contains(CHOICE_SEPARATOR) => {
                let choices = raw
                    .split(CHOICE_SEPARATOR)
                    .map(|choice| {
                        if choice.is_empty() {
                            Err(PathError::EmptyChoice { position })
                        } else {
                            decode_segment(choice)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(QuerySegment::Choice(choices))
            }
            _ => Ok(QuerySegment::Literal(decode_segment(raw)?)),
        }
    }
}

impl fmt::Display for QuerySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuerySegment::Literal(literal) => f.write_str(&encode_segment(literal)),
            QuerySegment::Choice(choices) => {
                for (i, choice) in choices.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{CHOICE_SEPARATOR}")?;
                    }
                    f.write_str(&encode_segment(choice))?;
                }
                Ok(())
            }
            QuerySegment::Wildcard => f.write_str(WILDCARD),
            QuerySegment::Skip => f.write_str(SKIP),
        }
    }
}

/// A path pattern matched segment-wise against concrete [`Path`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Query {
    segments: Vec<QuerySegment>,
}

impl Query {
    /// Builds a query from segments.
    pub fn new(segments: Vec<QuerySegment>) -> Result<Self, PathError> {
        for (position, segment) in segments.iter().enumerate() {
            match segment {
                QuerySegment::Literal(literal) if literal.is_empty() => {
                    return Err(PathError::EmptySegment { position });
                }
                QuerySegment::Choice(choices)
                    if choices.is_empty() || choices.iter().any(String::is_empty) =>
                {
                    return Err(PathError::EmptyChoice { position });
                }
                _ => {}
            }
        }
        Ok(Self { segments })
    }

    /// Parses the text form, e.g. `foo>\>bar>hello<world>|`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::default());
        }
        let segments = text
            .split(SEPARATOR)
            .enumerate()
            .map(|(position, raw)| QuerySegment::parse(raw, position))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// The pattern segments.
    pub fn segments(&self) -> &[QuerySegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the query has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is a pattern.
    pub fn is_pattern(&self) -> bool {
        self.segments.iter().any(QuerySegment::is_pattern)
    }

    /// The literal prefix before the first pattern segment.
    pub fn stem_path(&self) -> Path {
        let stem = self
            .segments
            .iter()
            .map_while(|segment| match segment {
                QuerySegment::Literal(literal) => Some(literal.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        // Literals are validated non-empty on construction.
        Path::new(stem).unwrap_or_default()
    }

    /// Whether the whole of `path` matches this query.
    pub fn matches_path(&self, path: &Path) -> bool {
        match_segments(&self.segments, path.segments())
    }

    /// Whether this query matches `path` or any of its ancestors.
    pub fn matches_prefix_of(&self, path: &Path) -> bool {
        let segments = path.segments();
        (0..=segments.len()).any(|len| match_segments(&self.segments, &segments[..len]))
    }
}

/// Matches `pattern` against the whole of `path`.
///
/// Works backwards over the pattern keeping one row of answers: `next[j]`
/// tells whether the rest of the pattern matches `path[j..]`. A skip either
/// ends at `j` or absorbs `path[j]` and stays on the same row, so any number
/// of skips costs `O(pattern.len() * path.len())`.
fn match_segments(pattern: &[QuerySegment], path: &[String]) -> bool {
    let len = path.len();
    let mut next = vec![false; len + 1];
    next[len] = true;

    for segment in pattern.iter().rev() {
        let mut row = vec![false; len + 1];
        for j in (0..=len).rev() {
            row[j] = match segment {
                QuerySegment::Skip => next[j] || (j < len && row[j + 1]),
                _ => j < len && next[j + 1] && segment.matches(&path[j]),
            };
        }
        next = row;
    }
    next[0]
}

impl From<Path> for Query {
    fn from(path: Path) -> Self {
        Self {
            segments: path
                .segments()
                .iter()
                .cloned()
                .map(QuerySegment::Literal)
                .collect(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Query {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
