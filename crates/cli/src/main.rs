// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `helios`: a thin RPC client used only for smoke-testing the Master's
//! surface (§4.3, §6). The real operator CLI is out of scope (§1).

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "helios", version = env!("BUILD_GIT_HASH"), styles = color::styles())]
struct Cli {
    /// Address of the Master's RPC listener.
    #[arg(long, global = true, env = "HELIOS_MASTER_ADDR", default_value = "127.0.0.1:4610")]
    master: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a Job descriptor, deriving its content-addressed id.
    CreateJob {
        #[arg(long)]
        name: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        image: String,
        /// Container command, e.g. `--command /bin/sh --command -c --command "echo hi"`.
        #[arg(long = "command")]
        command: Vec<String>,
        /// `KEY=VALUE` environment variable, may be repeated.
        #[arg(long = "env")]
        env: Vec<String>,
    },
    /// Remove a Job, failing if it is still deployed anywhere.
    RemoveJob { job_id: String },
    /// Deploy a Job to a host with a goal (default `start`).
    Deploy {
        job_id: String,
        host: String,
        #[arg(long, default_value = "start")]
        goal: String,
    },
    /// Change the goal of an existing Deployment.
    SetGoal { job_id: String, host: String, goal: String },
    /// Remove a Deployment entirely.
    Undeploy { job_id: String, host: String },
    /// Fetch one Job by id.
    GetJob { job_id: String },
    /// List Jobs, optionally filtered by name.
    ListJobs {
        #[arg(long)]
        name: Option<String>,
    },
    /// Fetch a host's aggregated status.
    HostStatus { host: String },
    /// Fetch a Job's retained history trail.
    JobHistory { job_id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = run(&cli.master, cli.command).await;
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.code);
    }
}

async fn run(addr: &str, command: Command) -> Result<(), ExitError> {
    match command {
        Command::CreateJob { name, version, image, command, env } => {
            commands::create_job(addr, name, version, image, command, env).await
        }
        Command::RemoveJob { job_id } => commands::remove_job(addr, job_id).await,
        Command::Deploy { job_id, host, goal } => commands::deploy(addr, job_id, host, goal).await,
        Command::SetGoal { job_id, host, goal } => commands::set_goal(addr, job_id, host, goal).await,
        Command::Undeploy { job_id, host } => commands::undeploy(addr, job_id, host).await,
        Command::GetJob { job_id } => commands::get_job(addr, job_id).await,
        Command::ListJobs { name } => commands::list_jobs(addr, name).await,
        Command::HostStatus { host } => commands::host_status(addr, host).await,
        Command::JobHistory { job_id } => commands::job_history(addr, job_id).await,
    }
}
