// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RPC error envelope, carrying the kind tags §4.3/§7 name
//! (`JobExists`, `JobNotFound`, ...) across the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kinds surfaced by the Master's RPC handlers (§4.3 table, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcErrorKind {
    InvalidJob,
    JobExists,
    JobNotFound,
    JobStillDeployed,
    HostNotFound,
    HostNotRegistered,
    AlreadyDeployed,
    DeploymentNotFound,
    /// Coordination-store `Transient`/`SessionLost` surfaced after the
    /// Master's own retry budget is exhausted (§7 Fatal/Transient).
    Unavailable,
}

/// An error carrying a `kind` tag and a human-readable message, as §7
/// requires ("All surfaced errors carry a kind tag and a human-readable
/// message").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind:?}: {message}")]
pub struct RpcError {
    pub kind: RpcErrorKind,
    pub message: String,
}

impl RpcError {
    pub fn new(kind: RpcErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}
