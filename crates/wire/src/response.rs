// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Success-shape responses for the Master's RPC surface (§4.3 table).

use helios_core::{HostStatus, Job, JobId, TaskStatusEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "body")]
pub enum Response {
    JobId(JobId),
    Ok,
    Job(Job),
    Jobs(Vec<Job>),
    HostStatus(HostStatus),
    History(Vec<TaskStatusEvent>),
}
