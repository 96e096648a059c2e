// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One function per RPC op (§4.3 table), translating parsed CLI args into
//! a `helios_wire::Request` and the response into printed output.

use crate::client;
use crate::exit_error::ExitError;
use crate::output;
use helios_core::{Goal, JobConfig, JobId};
use helios_wire::{
    CreateJobRequest, DeployRequest, GetJobRequest, HostStatusRequest, JobHistoryRequest,
    ListJobsRequest, RemoveJobRequest, Request, Response, SetGoalRequest, UndeployRequest,
};
use std::collections::BTreeMap;

pub fn parse_job_id(s: &str) -> Result<JobId, ExitError> {
    JobId::parse(s).map_err(|e| ExitError::new(1, format!("invalid job id {s:?}: {e}")))
}

pub fn parse_goal(s: &str) -> Result<Goal, ExitError> {
    match s {
        "start" => Ok(Goal::Start),
        "stop" => Ok(Goal::Stop),
        "undeploy" => Ok(Goal::Undeploy),
        other => Err(ExitError::new(1, format!("invalid goal {other:?}, expected start|stop|undeploy"))),
    }
}

/// Parses `KEY=VALUE` pairs from `--env` flags into a sorted map.
pub fn parse_env(pairs: &[String]) -> Result<BTreeMap<String, String>, ExitError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| ExitError::new(1, format!("invalid --env {pair:?}, expected KEY=VALUE")))
        })
        .collect()
}

pub async fn create_job(
    addr: &str,
    name: String,
    version: String,
    image: String,
    command: Vec<String>,
    env: Vec<String>,
) -> Result<(), ExitError> {
    let env = parse_env(&env)?;
    let config = JobConfig::new(name, version, image).command(command).env(env);
    let request = Request::CreateJob(CreateJobRequest { config, hash: None });
    match client::call(addr, request).await? {
        Response::JobId(id) => {
            output::job_id(&id);
            Ok(())
        }
        other => Err(unexpected_response("CreateJob", other)),
    }
}

pub async fn remove_job(addr: &str, job_id: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let request = Request::RemoveJob(RemoveJobRequest { job_id });
    match client::call(addr, request).await? {
        Response::Ok => Ok(()),
        other => Err(unexpected_response("RemoveJob", other)),
    }
}

pub async fn deploy(addr: &str, job_id: String, host: String, goal: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let goal = parse_goal(&goal)?;
    let request = Request::Deploy(DeployRequest { job_id, host, goal });
    match client::call(addr, request).await? {
        Response::Ok => Ok(()),
        other => Err(unexpected_response("Deploy", other)),
    }
}

pub async fn set_goal(addr: &str, job_id: String, host: String, goal: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let goal = parse_goal(&goal)?;
    let request = Request::SetGoal(SetGoalRequest { job_id, host, goal });
    match client::call(addr, request).await? {
        Response::Ok => Ok(()),
        other => Err(unexpected_response("SetGoal", other)),
    }
}

pub async fn undeploy(addr: &str, job_id: String, host: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let request = Request::Undeploy(UndeployRequest { job_id, host });
    match client::call(addr, request).await? {
        Response::Ok => Ok(()),
        other => Err(unexpected_response("Undeploy", other)),
    }
}

pub async fn get_job(addr: &str, job_id: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let request = Request::GetJob(GetJobRequest { job_id });
    match client::call(addr, request).await? {
        Response::Job(job) => {
            output::job(&job);
            Ok(())
        }
        other => Err(unexpected_response("GetJob", other)),
    }
}

pub async fn list_jobs(addr: &str, name: Option<String>) -> Result<(), ExitError> {
    let request = Request::ListJobs(ListJobsRequest { name });
    match client::call(addr, request).await? {
        Response::Jobs(jobs) => {
            output::jobs(&jobs);
            Ok(())
        }
        other => Err(unexpected_response("ListJobs", other)),
    }
}

pub async fn host_status(addr: &str, host: String) -> Result<(), ExitError> {
    let request = Request::HostStatus(HostStatusRequest { host: host.clone() });
    match client::call(addr, request).await? {
        Response::HostStatus(status) => {
            output::host_status(&host, &status);
            Ok(())
        }
        other => Err(unexpected_response("HostStatus", other)),
    }
}

pub async fn job_history(addr: &str, job_id: String) -> Result<(), ExitError> {
    let job_id = parse_job_id(&job_id)?;
    let request = Request::JobHistory(JobHistoryRequest { job_id });
    match client::call(addr, request).await? {
        Response::History(events) => {
            output::history(&events);
            Ok(())
        }
        other => Err(unexpected_response("JobHistory", other)),
    }
}

fn unexpected_response(op: &str, response: Response) -> ExitError {
    ExitError::new(2, format!("master returned an unexpected response shape for {op}: {response:?}"))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
