//! Dot-separated property paths.
//!
//! Grammar:
//!   segment(.segment)*
//! Examples:
//!   "position.x" -> ["position", "x"]
//!   "points.p1.angle" -> ["points", "p1", "angle"]
//!
//! Segments may not be empty or contain whitespace.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PropertyError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dotted path string.
    pub fn parse(s: &str) -> Result<Self, PropertyError> {
        let invalid = |reason: &str| PropertyError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };
        if s.is_empty() {
            return Err(invalid("empty path"));
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("empty segment"));
        }
        if segments
            .iter()
            .any(|seg| seg.chars().any(char::is_whitespace))
        {
            return Err(invalid("segment contains whitespace"));
        }
        Ok(Self { segments })
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PropertyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = segments.into_iter().map(Into::into).collect();
        Self::parse(&joined.join("."))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for a path with exactly one segment (a direct child name).
    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Everything after the first segment, or `None` for single-segment paths.
    pub fn rest(&self) -> Option<PropertyPath> {
        if self.is_single() {
            None
        } else {
            Some(PropertyPath {
                segments: self.segments[1..].to_vec(),
            })
        }
    }

    /// Whether `self` equals `other` or is a dotted prefix of it.
    pub fn is_prefix_of(&self, other: &PropertyPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Path with `child` appended.
    pub fn join(&self, child: &str) -> PropertyPath {
        let mut segments = self.segments.clone();
        segments.push(child.to_string());
        PropertyPath { segments }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for PropertyPath {
    type Err = PropertyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

impl Serialize for PropertyPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D>(deserializer: D) -> Result<PropertyPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PropertyPath::parse(&s).map_err(de::Error::custom)
    }
}

/// Name-level overlap test shared by effect conflict checks.
///
/// Exact equality always overlaps; when `strict` is false a dotted prefix
/// overlaps too (`position` vs `position.x`). Unparseable names only match
/// exactly.
pub fn names_overlap(a: &str, b: &str, strict: bool) -> bool {
    if a == b {
        return true;
    }
    if strict {
        return false;
    }
    match (PropertyPath::parse(a), PropertyPath::parse(b)) {
        (Ok(pa), Ok(pb)) => pa.is_prefix_of(&pb) || pb.is_prefix_of(&pa),
        _ => false,
    }
}
