//! Concrete event paths.
//!
//! A [`Path`] is an ordered list of non-empty segments identifying a location
//! in an event space. In text form segments are joined by `>`; characters with
//! a meaning in path or query syntax are percent-escaped so that any path
//! survives a round trip through its string form.
//!
//! ```rust
//! use ramify_core::Path;
//!
//! let path: Path = "app>users>42".parse().unwrap();
//! assert_eq!(path.len(), 3);
//! assert!(Path::parse("app").unwrap().is_ancestor_of(&path));
//! assert_eq!(path.to_string(), "app>users>42");
//! ```

use crate::error::PathError;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::{borrow::Cow, fmt, str::FromStr};

/// Separator between segments in text form.
pub const SEPARATOR: char = '>';

/// Characters escaped inside a segment.
pub(crate) const RESERVED: &AsciiSet = &CONTROLS
    .add(b'%')
    .add(b'>')
    .add(b'<')
    .add(b'|')
    .add(b'\\');

pub(crate) fn encode_segment(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, RESERVED).into()
}

pub(crate) fn decode_segment(raw: &str) -> Result<String, PathError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| PathError::Decode(raw.to_owned()))
}

/// An ordered sequence of segments identifying a location in an event space.
///
/// Equality and ordering are segment-wise, so descendants of a path sort
/// directly after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The root path (no segments).
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Builds a path from raw (unescaped) segments.
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(position) = segments.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment { position });
        }
        Ok(Self { segments })
    }

    /// Parses the `>`-delimited text form.
    ///
    /// The empty string is the root path. Unescaped query syntax (`|`, `\`,
    /// `<`) is rejected; use [`Query`](crate::Query) or
    /// [`EventPath`](crate::EventPath) for patterns.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for (position, raw) in text.split(SEPARATOR).enumerate() {
            if raw.is_empty() {
                return Err(PathError::EmptySegment { position });
            }
            if raw == "|" || raw == "\\" || raw.contains('<') {
                return Err(PathError::NotConcrete(text.to_owned()));
            }
            segments.push(decode_segment(raw)?);
        }
        Ok(Self { segments })
    }

    /// The segments, unescaped.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: impl Into<String>) -> Result<&mut Self, PathError> {
        let segment = segment.into();
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                position: self.segments.len(),
            });
        }
        self.segments.push(segment);
        Ok(self)
    }

    /// Returns a copy of this path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let mut child = self.clone();
        child.push(segment)?;
        Ok(child)
    }

    /// Removes the last segment in place. Returns `None` on the root path.
    pub fn shrink(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// The path one level up, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self {
            segments: head.to_vec(),
        })
    }

    /// Whether `other` starts with this path's segments.
    ///
    /// Non-strict: every path is an ancestor of itself.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Whether this path starts with `other`'s segments (non-strict).
    pub fn is_descendant_of(&self, other: &Path) -> bool {
        other.is_ancestor_of(self)
    }

    /// Iterates this path and all its ancestors, deepest first, root excluded.
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (1..=self.segments.len()).rev().map(|len| Path {
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(&encode_segment(segment))?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
