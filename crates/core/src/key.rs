//! Path-derived blob keys.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier of a blob: an ordered sequence of path segments.
///
/// Two keys are equal iff their segment sequences are equal. A key with no
/// segments is the root key, which addresses the whole store as a listing
/// prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The root key (no segments).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a key from a URL path.
    ///
    /// The leading separator is stripped and empty segments are dropped, so
    /// `/a//b/` and `a/b` produce the same key. Segments that would traverse
    /// outside a storage root (`.` and `..`) are rejected.
    pub fn from_path(path: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" => continue,
                "." | ".." => {
                    return Err(Error::InvalidKey(format!(
                        "path traversal not allowed: {path}"
                    )));
                }
                _ => segments.push(segment.to_string()),
            }
        }
        Ok(Self { segments })
    }

    /// Build a key from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut key = Self::root();
        for segment in segments {
            let segment = segment.into();
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
                return Err(Error::InvalidKey(format!("invalid segment: {segment}")));
            }
            key.segments.push(segment);
        }
        Ok(key)
    }

    /// The key's segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root key.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this key is a segment-wise prefix of `other`.
    ///
    /// The root key is a prefix of every key. `a/b` is a prefix of `a/b` and
    /// `a/b/c`, but not of `a/bc`.
    pub fn is_prefix_of(&self, other: &Key) -> bool {
        other.segments.len() >= self.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_path(&value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}
