//! Remote directory paths.
//!
//! A [`RemotePath`] is the ordered list of directory names from the server
//! root down to a directory. The root is the empty list. On the wire a path
//! is the segments joined with `/` and no leading slash, which is also the
//! key the listing cache uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BrowseError, Result};

const SEPARATOR: char = '/';

/// A location on the remote file server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// The server root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments, validating each one.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments
            .into_iter()
            .try_fold(Self::root(), |path, segment| path.descend(segment.as_ref()))
    }

    /// Parse a `/`-joined key back into a path.
    ///
    /// A single leading or trailing slash is tolerated; any empty segment in
    /// between is rejected.
    pub fn parse(key: &str) -> Result<Self> {
        let trimmed = key.strip_prefix(SEPARATOR).unwrap_or(key);
        let trimmed = trimmed.strip_suffix(SEPARATOR).unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_segments(trimmed.split(SEPARATOR))
    }

    /// Parse leniently, skipping empty segments (`a//b/` becomes `a/b`).
    pub fn normalize(raw: &str) -> Self {
        Self {
            segments: raw
                .split(SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append one directory name.
    pub fn descend(&self, segment: &str) -> Result<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Truncate to the first `depth` segments.
    pub fn ascend_to(&self, depth: usize) -> Result<Self> {
        if depth > self.segments.len() {
            return Err(BrowseError::OutOfRange {
                depth,
                len: self.segments.len(),
            });
        }
        Ok(Self {
            segments: self.segments[..depth].to_vec(),
        })
    }

    /// The containing directory, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let depth = self.segments.len().checked_sub(1)?;
        Some(Self {
            segments: self.segments[..depth].to_vec(),
        })
    }

    /// Last segment, or `None` at the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Stable cache key; also the value sent as the `path` query parameter.
    pub fn to_key(&self) -> String {
        self.segments.join("/")
    }

    /// Segments in display order, root first.
    pub fn to_display_segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }

    /// Navigation trail: the root (labelled `/`) followed by every prefix of
    /// this path, each with the path it leads to.
    pub fn breadcrumbs(&self) -> Vec<(String, RemotePath)> {
        let mut crumbs = Vec::with_capacity(self.segments.len() + 1);
        crumbs.push(("/".to_string(), Self::root()));
        for depth in 1..=self.segments.len() {
            crumbs.push((
                self.segments[depth - 1].clone(),
                Self {
                    segments: self.segments[..depth].to_vec(),
                },
            ));
        }
        crumbs
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.contains(SEPARATOR) {
        return Err(BrowseError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.to_key())
    }
}

impl FromStr for RemotePath {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = BrowseError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.to_key()
    }
}
