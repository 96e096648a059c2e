// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination client error taxonomy (§4.2, §7).

use thiserror::Error;

/// Errors surfaced by [`crate::client::CoordinationClient`] operations.
///
/// `Transient` is retried internally with bounded exponential backoff by
/// [`crate::retry::with_retry`] before it ever reaches a caller;
/// `SessionLost` is never retried — it propagates so the owner can
/// re-bootstrap its view (§4.2, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("no node at path {0:?}")]
    NotFound(String),
    #[error("node already exists at path {0:?}")]
    Exists(String),
    #[error("version mismatch at path {0:?}: expected {expected}, found {found}", expected = .1, found = .2)]
    BadVersion(String, i64, i64),
    #[error("transient coordination failure: {0}")]
    Transient(String),
    #[error("coordination session lost")]
    SessionLost,
}

impl CoordError {
    /// True for errors the internal retry loop should retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoordError::Transient(_))
    }
}
