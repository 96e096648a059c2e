// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable rendering of RPC responses. Kept deliberately thin —
//! this is a smoke-test client, not an operator dashboard (§1).

use crate::color;
use helios_core::{HostStatus, Job, JobId, TaskStatusEvent};

pub fn job_id(id: &JobId) {
    println!("{}", color::literal(&id.to_string()));
}

pub fn job(job: &Job) {
    println!("{} {}", color::header("id:"), color::literal(&job.id.to_string()));
    println!("{} {}", color::header("image:"), job.config.image);
    if !job.config.command.is_empty() {
        println!("{} {}", color::header("command:"), job.config.command.join(" "));
    }
    for (k, v) in &job.config.env {
        println!("{} {k}={v}", color::context("env:"));
    }
    for (label, mapping) in &job.config.ports {
        let external = mapping.external_port.map(|p| p.to_string()).unwrap_or_else(|| "dynamic".to_string());
        println!("{} {label}: {} -> {external}", color::context("port:"), mapping.internal_port);
    }
}

pub fn jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("{}", color::context("no jobs"));
        return;
    }
    for j in jobs {
        println!("{}  {}", color::literal(&j.id.to_string()), j.config.image);
    }
}

pub fn host_status(host: &str, status: &HostStatus) {
    let state = if status.is_up() { "UP" } else { "DOWN" };
    println!("{} {host}  {}", color::header("host:"), color::literal(state));
    if let Some(info) = &status.agent_info {
        println!("{} agent {}", color::context("  "), info.version);
    }
    if let Some(info) = &status.runtime_info {
        println!("{} runtime {} {}", color::context("  "), info.runtime_name, info.runtime_version);
    }
    for job_id in &status.jobs {
        let task = status.statuses.get(&job_id.to_string());
        match task {
            Some(t) => println!("  {} {:?}", color::literal(&job_id.to_string()), t.state),
            None => println!("  {} (no status published)", color::literal(&job_id.to_string())),
        }
    }
}

pub fn history(events: &[TaskStatusEvent]) {
    if events.is_empty() {
        println!("{}", color::context("no history"));
        return;
    }
    for e in events {
        println!(
            "{} {:?} container={}",
            e.timestamp,
            e.status.state,
            e.status.container_id.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
