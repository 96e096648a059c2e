// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment: the desired-state association of (Job, Host, Goal) the
//! Master writes to `/config/hosts/<host>/jobs/<jobId>`.

use crate::job_id::JobId;
use serde::{Deserialize, Serialize};

/// Operator intent for a Deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Start,
    Stop,
    Undeploy,
}

crate::simple_display! {
    Goal {
        Start => "START",
        Stop => "STOP",
        Undeploy => "UNDEPLOY",
    }
}

/// Desired state of a Job on a Host. Holds only the JobId (never the Job
/// itself) — the Job is looked up through the coordination store, which
/// resolves the cyclic reference the original object model had between
/// Deployment and Job (§9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub job_id: JobId,
    pub host: String,
    pub goal: Goal,
}

impl Deployment {
    pub fn new(job_id: JobId, host: impl Into<String>, goal: Goal) -> Self {
        Self { job_id, host: host.into(), goal }
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
