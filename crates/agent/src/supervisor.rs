// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent supervisor (§4.4): registers this host's liveness, watches
//! `/config/hosts/<self>/jobs`, and reconciles the desired deployment set
//! against a key-locked map of [`TaskRunner`](crate::task_runner::TaskRunner)
//! actors, one per JobId. Mirrors the teacher's `RuntimeRouter`/watch-loop
//! shape (`daemon/src/adapters/agent/router.rs`,
//! `adapters/src/agent/watcher_tests/watch_loop.rs`): a single reconcile
//! loop driven by edge-triggered watch events, generalized from file-watch
//! polling to coordination-store watches.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::ports::PortAllocator;
use crate::runtime::ContainerRuntime;
use crate::task_runner::TaskRunner;
use helios_core::{paths, AgentInfo, Clock, Deployment, Goal, HostInfoRecord, JobId, RuntimeInfo, TaskState};
use helios_coord::{CoordError, CoordinationClient, CreateMode, WatchEvent, WatchKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running [`TaskRunner`]'s supervisor-side handle: a channel to push
/// goal changes into its driver loop and the join handle to wait on when
/// stopping it. Dropping `goal_tx` (by removing the handle) lets the
/// driver loop notice the sender is gone and exit on its own next tick.
struct RunnerHandle {
    goal_tx: watch::Sender<Goal>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// On each host: registers the ephemeral `up` node, publishes
/// `agentInfo`/`runtimeInfo`, then loops watching
/// `/config/hosts/<self>/jobs` and reconciling (§4.4).
pub struct Supervisor<C, R, K> {
    client: Arc<C>,
    runtime: Arc<R>,
    clock: K,
    config: AgentConfig,
    ports: Arc<Mutex<PortAllocator>>,
    runners: AsyncMutex<HashMap<JobId, RunnerHandle>>,
}

impl<C, R, K> Supervisor<C, R, K>
where
    C: CoordinationClient,
    R: ContainerRuntime,
    K: Clock + 'static,
{
    pub fn new(client: Arc<C>, runtime: Arc<R>, clock: K, config: AgentConfig) -> Self {
        let ports = Arc::new(Mutex::new(PortAllocator::new(config.port_range())));
        Self { client, runtime, clock, config, ports, runners: AsyncMutex::new(HashMap::new()) }
    }

    /// Runs until `shutdown` is cancelled. A `SessionLost` anywhere in the
    /// loop below sends the Agent back to re-register and re-publish its
    /// full state (§4.4: "The Agent must handle `SessionLost` by
    /// re-registering and re-publishing its full state; watchers must
    /// handle the resulting event storm idempotently") — reconcile is
    /// naturally idempotent since it diffs against the store on every call.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                self.shutdown_all_runners().await;
                return;
            }
            match self.bootstrap_and_watch(&shutdown).await {
                Ok(()) => {
                    self.shutdown_all_runners().await;
                    return;
                }
                Err(AgentError::SessionLost) => {
                    tracing::warn!(host = %self.config.host, "coordination session lost, re-bootstrapping");
                }
                Err(e) => {
                    tracing::error!(host = %self.config.host, error = %e, "agent bootstrap failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// One bootstrap-and-reconcile lifetime: register `up`, publish
    /// info, then reconcile on every watch fire until the session is lost
    /// or shutdown is requested (§4.4 steps 1-3).
    async fn bootstrap_and_watch(&self, shutdown: &CancellationToken) -> Result<(), AgentError> {
        self.client.ensure_path(&paths::status_hosts_root()).await?;
        self.client.ensure_path(&format!("/status/hosts/{}", self.config.host)).await?;
        let mut up = self
            .client
            .register_ephemeral(&paths::status_host_up(&self.config.host), Vec::new())
            .await?;
        self.publish_info().await?;
        self.client.ensure_path(&paths::config_hosts_root()).await?;
        self.client.ensure_path(&paths::config_host_jobs_root(&self.config.host)).await?;

        loop {
            let watch_path = paths::config_host_jobs_root(&self.config.host);
            let mut watch = self.client.watch(&watch_path, WatchKind::Children).await?;
            self.reconcile().await?;

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = up.lost() => return Err(AgentError::SessionLost),
                event = watch.recv() => match event {
                    Some(WatchEvent::Fired) => continue,
                    Some(WatchEvent::SessionLost) | None => return Err(AgentError::SessionLost),
                },
            }
        }
    }

    /// Republishes `/status/hosts/<host>/info` (§4.4 step 2). Called once
    /// at bootstrap; a real Agent would call it again whenever
    /// `agentInfo`/`runtimeInfo` changes, but neither changes within one
    /// process lifetime in this workspace.
    async fn publish_info(&self) -> Result<(), AgentError> {
        let record = HostInfoRecord {
            agent_info: Some(AgentInfo {
                version: env!("CARGO_PKG_VERSION").to_string(),
                start_time_ms: self.clock.epoch_ms(),
            }),
            runtime_info: Some(RuntimeInfo {
                runtime_name: self.runtime.runtime_name().to_string(),
                runtime_version: self.runtime.runtime_version().to_string(),
            }),
            environment: Default::default(),
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| AgentError::Coordination(e.to_string()))?;
        let path = paths::status_host_info(&self.config.host);
        match self.client.set(&path, bytes.clone()).await {
            Ok(_) => Ok(()),
            Err(CoordError::NotFound(_)) => {
                self.client.create(&path, bytes, CreateMode::Persistent).await.map_err(Into::into)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Diffs the desired deployment set against the currently running
    /// [`TaskRunner`]s and spawns/updates/stops as needed (§4.4
    /// reconciliation policy). Multiple Task Runners for the same JobId
    /// are forbidden — `runners` is keyed by JobId, so a second desired
    /// entry for an already-running JobId only ever updates its goal.
    async fn reconcile(&self) -> Result<(), AgentError> {
        let desired = self.read_desired().await?;
        let mut runners = self.runners.lock().await;

        for job_id in runners.keys().cloned().collect::<Vec<_>>() {
            if !desired.contains_key(&job_id) {
                if let Some(handle) = runners.get(&job_id) {
                    let _ = handle.goal_tx.send(Goal::Undeploy);
                }
            }
        }

        for (job_id, goal) in &desired {
            match runners.get(job_id) {
                Some(handle) => {
                    let _ = handle.goal_tx.send(*goal);
                }
                None => {
                    let handle = self.spawn_runner(job_id.clone(), *goal);
                    runners.insert(job_id.clone(), handle);
                }
            }
        }

        runners.retain(|job_id, handle| {
            if handle.join.is_finished() {
                tracing::debug!(job_id = %job_id, "task runner finished, removing from supervisor");
                false
            } else {
                true
            }
        });
        Ok(())
    }

    async fn read_desired(&self) -> Result<HashMap<JobId, Goal>, AgentError> {
        let root = paths::config_host_jobs_root(&self.config.host);
        let names = match self.client.children(&root).await {
            Ok(names) => names,
            Err(CoordError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut desired = HashMap::with_capacity(names.len());
        for name in names {
            let job_id = JobId::parse(&name)?;
            let path = paths::config_host_job(&self.config.host, &job_id);
            let (bytes, _) = match self.client.get(&path).await {
                Ok(v) => v,
                Err(CoordError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            let deployment: Deployment =
                serde_json::from_slice(&bytes).map_err(|e| AgentError::Coordination(e.to_string()))?;
            desired.insert(job_id, deployment.goal);
        }
        Ok(desired)
    }

    fn spawn_runner(&self, job_id: JobId, goal: Goal) -> RunnerHandle {
        let (goal_tx, goal_rx) = watch::channel(goal);
        let cancel = CancellationToken::new();
        let runner = TaskRunner::new(
            job_id.clone(),
            self.config.host.clone(),
            Arc::clone(&self.client),
            Arc::clone(&self.runtime),
            Arc::clone(&self.ports),
            self.clock.clone(),
            &self.config,
        );
        let poll_interval = self.config.poll_interval;
        let driver_cancel = cancel.clone();
        let join = tokio::spawn(async move {
            drive_task_runner(runner, goal_rx, poll_interval, driver_cancel).await;
        });
        tracing::info!(job_id = %job_id, "spawned task runner");
        RunnerHandle { goal_tx, cancel, join }
    }

    async fn shutdown_all_runners(&self) {
        let mut runners = self.runners.lock().await;
        for (job_id, handle) in runners.drain() {
            handle.cancel.cancel();
            if handle.join.await.is_err() {
                tracing::warn!(job_id = %job_id, "task runner task panicked during shutdown");
            }
        }
    }

    #[cfg(test)]
    async fn runner_count(&self) -> usize {
        self.runners.lock().await.len()
    }
}

/// Drives one [`TaskRunner`] to completion: bootstraps, then alternates
/// between stepping until quiescent and waiting for the next goal change,
/// poll tick, or shutdown. Exits on its own once the task reaches
/// `STOPPED` under an `UNDEPLOY` goal (§4.5's "STOPPING -> (removed)" row)
/// so the supervisor's next reconcile simply finds the slot empty.
async fn drive_task_runner<C, R, K>(
    mut runner: TaskRunner<C, R, K>,
    mut goal_rx: watch::Receiver<Goal>,
    poll_interval: Duration,
    shutdown: CancellationToken,
) where
    C: CoordinationClient,
    R: ContainerRuntime,
    K: Clock,
{
    runner.set_goal(*goal_rx.borrow());
    if let Err(e) = runner.bootstrap().await {
        tracing::warn!(error = %e, "task runner bootstrap failed");
        return;
    }

    loop {
        loop {
            match runner.step().await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "task runner step failed");
                    break;
                }
            }
        }

        if runner.state() == TaskState::Stopped && *goal_rx.borrow() == Goal::Undeploy {
            return;
        }

        tokio::select! {
            _ = shutdown.cancelled() => return,
            changed = goal_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                runner.set_goal(*goal_rx.borrow());
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
