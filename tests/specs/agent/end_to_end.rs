// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level scenarios driving a `Master` and a live `Supervisor`
//! against the same in-memory coordination store — exercises the
//! boundary between the two crates that neither crate's own test suite
//! can, since each tests its half against a bare store.

use helios_agent::runtime::fake::FakeContainerRuntime;
use helios_agent::{AgentConfig, Supervisor};
use helios_core::{FakeClock, JobConfig, PortMapping, TaskState};
use helios_coord::MemoryStore;
use helios_master::{Master, MasterConfig};
use helios_wire::{CreateJobRequest, DeployRequest, HostStatusRequest, JobHistoryRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const HOST: &str = "host-a";

fn agent_config() -> AgentConfig {
    AgentConfig { host: HOST.to_string(), poll_interval: Duration::from_millis(5), ..AgentConfig::default() }
}

async fn wait_until<F, Fut>(what: &str, mut f: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    timeout(Duration::from_secs(5), async {
        while !f().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for: {what}"));
}

/// `Supervisor::bootstrap_and_watch` registers the ephemeral `up` node
/// before it publishes `agentInfo`/`runtimeInfo` — waiting on `is_up()`
/// alone can race `Deploy`'s `assert_host_registered` check, which reads
/// the info node. Wait for both so callers never hit a spurious
/// `HostNotRegistered`.
async fn wait_for_registration(master: &Master<helios_coord::MemorySession>) {
    wait_until("agent registration visible to master", || async {
        master
            .host_status(HostStatusRequest { host: HOST.to_string() })
            .await
            .map(|s| s.is_up() && s.agent_info.is_some())
            .unwrap_or(false)
    })
    .await;
}

/// S3 — a Job with one fixed and one dynamic port, deployed to a host
/// that has already registered, reaches RUNNING with both ports resolved,
/// as observed through `Master::host_status` rather than the store
/// directly.
#[tokio::test]
async fn s3_multi_port_deploy_is_observable_via_host_status() {
    let store = MemoryStore::new();
    let master = Master::new(Arc::new(store.session()), MasterConfig::default());

    let config = JobConfig::new("web", "1", "nginx:1").ports(
        [
            ("http".to_string(), PortMapping::new(80).with_external_port(8080)),
            ("metrics".to_string(), PortMapping::new(9000)),
        ]
        .into_iter()
        .collect(),
    );
    let job_id = master.create_job(CreateJobRequest { config, hash: None }).await.unwrap();

    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut cfg = agent_config();
    cfg.dynamic_port_range = (30000, 30010);
    let supervisor = Arc::new(Supervisor::new(Arc::new(store.session()), runtime, FakeClock::new(), cfg));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(Arc::clone(&supervisor).run(shutdown.clone()));

    wait_for_registration(&master).await;

    master.deploy(DeployRequest { job_id: job_id.clone(), host: HOST.to_string(), goal: helios_core::Goal::Start }).await.unwrap();

    wait_until("task to reach RUNNING", || async {
        master
            .host_status(HostStatusRequest { host: HOST.to_string() })
            .await
            .ok()
            .and_then(|s| s.statuses.get(&job_id.to_string()).cloned())
            .map(|s| s.state == TaskState::Running)
            .unwrap_or(false)
    })
    .await;

    let status = master.host_status(HostStatusRequest { host: HOST.to_string() }).await.unwrap();
    let task = status.statuses.get(&job_id.to_string()).unwrap();
    assert_eq!(task.ports.get("http").and_then(|p| p.external_port), Some(8080));
    let metrics_port = task.ports.get("metrics").and_then(|p| p.external_port).expect("dynamic port assigned");
    assert!((30000..=30010).contains(&metrics_port));

    shutdown.cancel();
    let _ = timeout(Duration::from_secs(2), handle).await;
}

/// S4 — `Master::job_history` returns the full trail the Agent appended,
/// not just the live status.
#[tokio::test]
async fn s4_job_history_is_observable_via_master() {
    let store = MemoryStore::new();
    let master = Master::new(Arc::new(store.session()), MasterConfig::default());
    let job_id = master
        .create_job(CreateJobRequest { config: JobConfig::new("web", "1", "nginx:1"), hash: None })
        .await
        .unwrap();

    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let supervisor = Arc::new(Supervisor::new(Arc::new(store.session()), runtime, FakeClock::new(), agent_config()));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(Arc::clone(&supervisor).run(shutdown.clone()));

    wait_for_registration(&master).await;

    master.deploy(DeployRequest { job_id: job_id.clone(), host: HOST.to_string(), goal: helios_core::Goal::Start }).await.unwrap();

    wait_until("history to include a RUNNING event", || async {
        master
            .job_history(JobHistoryRequest { job_id: job_id.clone() })
            .await
            .map(|events| events.iter().any(|e| e.status.state == TaskState::Running))
            .unwrap_or(false)
    })
    .await;

    let history = master.job_history(JobHistoryRequest { job_id: job_id.clone() }).await.unwrap();
    let states: Vec<_> = history.iter().map(|e| e.status.state).collect();
    assert!(states.contains(&TaskState::Creating));
    assert!(states.contains(&TaskState::Running));
    assert!(states.windows(2).all(|w| {
        let order = |s: TaskState| match s {
            TaskState::Creating => 0,
            TaskState::PullingImage => 1,
            TaskState::Starting => 2,
            TaskState::Running => 3,
            TaskState::Stopping => 4,
            TaskState::Stopped => 5,
            TaskState::Exited => 6,
            TaskState::Failed => 7,
        };
        order(w[0]) <= order(w[1])
    }));

    shutdown.cancel();
    let _ = timeout(Duration::from_secs(2), handle).await;
}

/// S6 — once the Agent's coordination session is lost, `Master::host_status`
/// reports the host `DOWN` promptly.
#[tokio::test]
async fn s6_session_loss_is_observable_as_down_via_master() {
    let store = MemoryStore::new();
    let master = Master::new(Arc::new(store.session()), MasterConfig::default());

    let agent_session = store.session();
    let agent_session_id = agent_session.session_id();
    let runtime = Arc::new(FakeContainerRuntime::new());
    let supervisor = Arc::new(Supervisor::new(Arc::new(agent_session), runtime, FakeClock::new(), agent_config()));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(Arc::clone(&supervisor).run(shutdown.clone()));

    wait_until("host to come up", || async {
        master.host_status(HostStatusRequest { host: HOST.to_string() }).await.map(|s| s.is_up()).unwrap_or(false)
    })
    .await;

    store.kill_session(agent_session_id);

    wait_until("host to go down", || async {
        !master.host_status(HostStatusRequest { host: HOST.to_string() }).await.map(|s| s.is_up()).unwrap_or(true)
    })
    .await;

    shutdown.cancel();
    let _ = timeout(Duration::from_secs(2), handle).await;
}
