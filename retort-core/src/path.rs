//! Slash-delimited hierarchical addresses.
//!
//! A [`TreePath`] locates exactly one slot inside the hierarchical
//! container, filesystem-style: `Exp/mixtures/Solution0/Density`.

use std::fmt;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// A normalized, slash-delimited hierarchical address.
///
/// Stored without leading or trailing separators; empty segments are
/// collapsed away on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(String);

impl TreePath {
    /// Build a path from a raw string, normalizing separators.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let joined = raw
            .as_ref()
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// The empty path (no segments). Useful as a neutral prefix.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Append one segment. Empty segments are ignored.
    pub fn child(&self, segment: &str) -> Self {
        if segment.is_empty() {
            return self.clone();
        }
        if self.0.is_empty() {
            Self::new(segment)
        } else {
            let mut s = String::with_capacity(self.0.len() + 1 + segment.len());
            s.push_str(&self.0);
            s.push(SEPARATOR);
            s.push_str(segment);
            Self::new(s)
        }
    }

    /// Iterate over the path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Everything but the last segment, or `None` for empty and
    /// single-segment paths.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind(SEPARATOR)?;
        Some(Self(self.0[..idx].to_string()))
    }

    /// The last segment, or `None` for the empty path.
    pub fn leaf(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TreePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TreePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
