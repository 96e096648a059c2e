// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TaskStatus and the history trail the Agent appends at
//! `/history/jobs/<jobId>/hosts/<host>/events/<seq>`.

use crate::job_id::JobId;
use crate::port::PortMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task State Machine states (§4.5). Canonical normal-lifecycle order:
/// `CREATING -> PULLING_IMAGE* -> STARTING -> RUNNING -> EXITED`, or
/// `-> STOPPING -> STOPPED` on a goal change; `FAILED` is terminal for the
/// current incarnation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Creating,
    PullingImage,
    Starting,
    Running,
    Exited,
    Stopping,
    Stopped,
    Failed,
}

crate::simple_display! {
    TaskState {
        Creating => "CREATING",
        PullingImage => "PULLING_IMAGE",
        Starting => "STARTING",
        Running => "RUNNING",
        Exited => "EXITED",
        Stopping => "STOPPING",
        Stopped => "STOPPED",
        Failed => "FAILED",
    }
}

impl TaskState {
    /// Terminal states a TaskRunner will not transition out of on its own
    /// (reaching them again requires a fresh goal or restart policy).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Exited | TaskState::Stopped | TaskState::Failed)
    }
}

/// Why a task is currently throttled (backing off before a retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleReason {
    /// Permanent pull failure (e.g. image does not exist / 404 from registry).
    ImageMissing,
    /// Exponential-backoff restart throttling after `EXITED`.
    RestartBackoff,
}

/// Status the Agent publishes at `/status/hosts/<host>/jobs/<jobId>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub job: JobId,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttled: Option<ThrottleReason>,
    /// Resolved port assignments (external_port filled in once assigned).
    #[serde(default)]
    pub ports: BTreeMap<String, PortMapping>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl TaskStatus {
    pub fn new(job: JobId, state: TaskState) -> Self {
        Self { job, state, container_id: None, throttled: None, ports: BTreeMap::new(), env: BTreeMap::new() }
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }

    pub fn with_throttled(mut self, reason: ThrottleReason) -> Self {
        self.throttled = Some(reason);
        self
    }

    pub fn with_ports(mut self, ports: BTreeMap<String, PortMapping>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// One entry in a Task's history trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusEvent {
    pub status: TaskStatus,
    pub timestamp: u64,
}

impl TaskStatusEvent {
    pub fn new(status: TaskStatus, timestamp: u64) -> Self {
        Self { status, timestamp }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
