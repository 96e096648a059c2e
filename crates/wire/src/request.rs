// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request DTOs for the Master's RPC surface (§4.3).

use helios_core::{Goal, JobConfig, JobId};
use serde::{Deserialize, Serialize};

/// `CreateJob` — the Master re-derives the hash from `config` and rejects
/// a mismatch against `hash` when the operator supplies one (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub config: JobConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveJobRequest {
    pub job_id: JobId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub job_id: JobId,
    pub host: String,
    #[serde(default = "Goal::start_default")]
    pub goal: Goal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetGoalRequest {
    pub job_id: JobId,
    pub host: String,
    pub goal: Goal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndeployRequest {
    pub job_id: JobId,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetJobRequest {
    pub job_id: JobId,
}

/// `ListJobs` filters. Every field is optional; an absent filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListJobsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStatusRequest {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHistoryRequest {
    pub job_id: JobId,
}

/// The full RPC surface (§4.3), tagged so one TCP frame round-trips any
/// of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "body")]
pub enum Request {
    CreateJob(CreateJobRequest),
    RemoveJob(RemoveJobRequest),
    Deploy(DeployRequest),
    SetGoal(SetGoalRequest),
    Undeploy(UndeployRequest),
    GetJob(GetJobRequest),
    ListJobs(ListJobsRequest),
    HostStatus(HostStatusRequest),
    JobHistory(JobHistoryRequest),
}

impl Request {
    /// Short operation name, used for `tracing` spans and log lines.
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::CreateJob(_) => "CreateJob",
            Request::RemoveJob(_) => "RemoveJob",
            Request::Deploy(_) => "Deploy",
            Request::SetGoal(_) => "SetGoal",
            Request::Undeploy(_) => "Undeploy",
            Request::GetJob(_) => "GetJob",
            Request::ListJobs(_) => "ListJobs",
            Request::HostStatus(_) => "HostStatus",
            Request::JobHistory(_) => "JobHistory",
        }
    }
}

impl Goal {
    fn start_default() -> Self {
        Goal::Start
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
