// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent and Task Runner error taxonomy (§4.4, §4.5, §7), mirroring
//! `helios-master`'s per-crate `thiserror` enum with a `kind()` accessor
//! onto the five error kinds §7 names.

use helios_coord::CoordError;
use thiserror::Error;

/// The five kinds §7 names, shared across crates' error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Transient,
    Fatal,
}

#[derive(Debug, Error, Clone)]
pub enum AgentError {
    #[error("coordination store unavailable: {0}")]
    Coordination(String),
    #[error("coordination session lost")]
    SessionLost,
    #[error("host {0:?} is not configured")]
    InvalidHost(String),
    #[error("no free ports remain in the configured dynamic range for job {0}")]
    PortsExhausted(String),
    #[error("invalid deployment record: {0}")]
    InvalidDeployment(String),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Coordination(_) => ErrorKind::Transient,
            AgentError::SessionLost => ErrorKind::Fatal,
            AgentError::InvalidHost(_) => ErrorKind::Validation,
            AgentError::PortsExhausted(_) => ErrorKind::Transient,
            AgentError::InvalidDeployment(_) => ErrorKind::Validation,
        }
    }
}

impl From<helios_core::ParseError> for AgentError {
    fn from(e: helios_core::ParseError) -> Self {
        AgentError::InvalidDeployment(e.to_string())
    }
}

impl From<CoordError> for AgentError {
    fn from(e: CoordError) -> Self {
        match e {
            CoordError::SessionLost => AgentError::SessionLost,
            other => AgentError::Coordination(other.to_string()),
        }
    }
}

/// Per-task errors the Task State Machine surfaces internally. §4.5/§7:
/// "the Agent never fails a task *permanently* on a transient error" — the
/// Runner's driver loop matches on `kind()` to decide whether to record an
/// event and keep retrying (`Transient`) or to move to `FAILED`
/// (anything else reaching it from a runtime/pull operation already
/// classified as permanent).
#[derive(Debug, Error, Clone)]
pub enum TaskError {
    #[error("coordination store unavailable: {0}")]
    Coordination(String),
    #[error("coordination session lost")]
    SessionLost,
    #[error("container runtime error: {0}")]
    Runtime(String),
    #[error("image pull failed transiently: {0}")]
    TransientPull(String),
    #[error("image pull failed permanently: {0}")]
    PermanentPull(String),
    #[error("no free ports remain in the configured dynamic range")]
    PortsExhausted,
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Coordination(_) => ErrorKind::Transient,
            TaskError::SessionLost => ErrorKind::Fatal,
            TaskError::Runtime(_) => ErrorKind::Transient,
            TaskError::TransientPull(_) => ErrorKind::Transient,
            TaskError::PermanentPull(_) => ErrorKind::Validation,
            TaskError::PortsExhausted => ErrorKind::Transient,
        }
    }
}

impl From<CoordError> for TaskError {
    fn from(e: CoordError) -> Self {
        match e {
            CoordError::SessionLost => TaskError::SessionLost,
            other => TaskError::Coordination(other.to_string()),
        }
    }
}

impl From<crate::runtime::RuntimeError> for TaskError {
    fn from(e: crate::runtime::RuntimeError) -> Self {
        TaskError::Runtime(e.to_string())
    }
}

impl From<crate::ports::PortAllocationError> for TaskError {
    fn from(_: crate::ports::PortAllocationError) -> Self {
        TaskError::PortsExhausted
    }
}
