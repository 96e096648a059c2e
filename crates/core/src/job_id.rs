// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobId: `name:version[:hash]`, parsed and compared per the canonical
//! hashing scheme in [`crate::job`].

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Default truncation length for the "short" hash form (matches the
/// 7-hex-char convention git uses for abbreviated commit ids).
pub const SHORT_HASH_LEN: usize = 7;

/// Length of a fully-qualified hex SHA-1 digest.
pub const FULL_HASH_LEN: usize = 40;

/// `name:version[:hash]` identifier for a [`crate::job::Job`].
///
/// `hash` is `None` for a name-only or name:version id, `Some(_)` once a
/// hash suffix (full or truncated) is known. Serializes as the bare
/// `name:version:hash` string (or fewer parts), never as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId {
    name: String,
    version: String,
    hash: Option<String>,
}

impl JobId {
    /// Build a JobId directly from its parts. Does not validate hex-ness of
    /// `hash`; callers that need a fully-qualified id should go through
    /// [`crate::job::Job::build`].
    pub fn new(name: impl Into<String>, version: impl Into<String>, hash: Option<String>) -> Self {
        Self { name: name.into(), version: version.into(), hash }
    }

    /// Parse `name`, `name:version`, or `name:version:hash`. Any other
    /// number of colon-separated parts is a parse error.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [name] => {
                if name.is_empty() {
                    return Err(ParseError::EmptyName(s.to_string()));
                }
                Ok(Self::new(*name, String::new(), None))
            }
            [name, version] => {
                if name.is_empty() {
                    return Err(ParseError::EmptyName(s.to_string()));
                }
                Ok(Self::new(*name, *version, None))
            }
            [name, version, hash] => {
                if name.is_empty() {
                    return Err(ParseError::EmptyName(s.to_string()));
                }
                Ok(Self::new(*name, *version, Some((*hash).to_string())))
            }
            other => Err(ParseError::WrongPartCount(s.to_string(), other.len())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// True when `hash` is present and is a 40-character hex digest.
    pub fn is_fully_qualified(&self) -> bool {
        matches!(&self.hash, Some(h) if h.len() == FULL_HASH_LEN && h.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    /// Return a copy with the hash truncated to `n` hex characters (the
    /// "short form"). A no-op if there is no hash or it is already shorter.
    pub fn short(&self, n: usize) -> Self {
        let hash = self.hash.as_ref().map(|h| truncate(h, n).to_string());
        Self { name: self.name.clone(), version: self.version.clone(), hash }
    }
}

/// Returns a string slice truncated to at most `n` characters.
fn truncate(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hash {
            Some(hash) => write!(f, "{}:{}:{}", self.name, self.version, hash),
            None => write!(f, "{}:{}", self.name, self.version),
        }
    }
}

impl Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        JobId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Orders by name, then version, then hash — `None` (no hash) sorts first.
impl PartialOrd for JobId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JobId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

#[cfg(test)]
#[path = "job_id_tests.rs"]
mod tests;
