// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Master error taxonomy (§4.3, §7), mapped onto [`helios_wire::RpcErrorKind`]
//! at the RPC boundary.

use helios_core::{DescriptorError, ParseError};
use helios_coord::CoordError;
use helios_wire::RpcErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MasterError {
    #[error("invalid job: {0}")]
    InvalidJob(String),
    #[error("job {0} already exists")]
    JobExists(String),
    #[error("job {0} not found")]
    JobNotFound(String),
    #[error("job {0} is still deployed on at least one host")]
    JobStillDeployed(String),
    #[error("host {0} not found")]
    HostNotFound(String),
    #[error("host {0} has never registered with the coordination store")]
    HostNotRegistered(String),
    #[error("job {job} is already deployed on host {host}")]
    AlreadyDeployed { job: String, host: String },
    #[error("no deployment of job {job} on host {host}")]
    DeploymentNotFound { job: String, host: String },
    #[error("coordination store unavailable: {0}")]
    Unavailable(String),
}

impl MasterError {
    /// Map onto the wire-layer kind tag (§7: "all surfaced errors carry a
    /// kind tag").
    pub fn kind(&self) -> RpcErrorKind {
        match self {
            MasterError::InvalidJob(_) => RpcErrorKind::InvalidJob,
            MasterError::JobExists(_) => RpcErrorKind::JobExists,
            MasterError::JobNotFound(_) => RpcErrorKind::JobNotFound,
            MasterError::JobStillDeployed(_) => RpcErrorKind::JobStillDeployed,
            MasterError::HostNotFound(_) => RpcErrorKind::HostNotFound,
            MasterError::HostNotRegistered(_) => RpcErrorKind::HostNotRegistered,
            MasterError::AlreadyDeployed { .. } => RpcErrorKind::AlreadyDeployed,
            MasterError::DeploymentNotFound { .. } => RpcErrorKind::DeploymentNotFound,
            MasterError::Unavailable(_) => RpcErrorKind::Unavailable,
        }
    }
}

impl From<DescriptorError> for MasterError {
    fn from(e: DescriptorError) -> Self {
        MasterError::InvalidJob(e.to_string())
    }
}

impl From<ParseError> for MasterError {
    fn from(e: ParseError) -> Self {
        MasterError::InvalidJob(e.to_string())
    }
}

/// `Transient`/`SessionLost` from the coordination client surface as
/// `Unavailable` once the client's own retry budget (§4.2) is exhausted —
/// the Master never silently retries a write that could have side effects
/// (§7), so anything reaching here has already exhausted idempotent reads.
impl From<CoordError> for MasterError {
    fn from(e: CoordError) -> Self {
        MasterError::Unavailable(e.to_string())
    }
}
