// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Task State Machine (§4.5): per-task reconciliation driving image
//! pull, container create/start/stop, exit capture, status publication,
//! and the history trail. [`TaskRunner::step`] performs exactly one
//! transition-table row per call — coarse sampling during fast
//! transitions is explicitly permitted (§4.5) — so the async driver in
//! [`crate::supervisor`] is a thin loop around it, and tests can drive the
//! machine deterministically one step at a time without relying on timing.

use crate::error::TaskError;
use crate::ports::PortAllocator;
use crate::runtime::{ContainerId, ContainerRuntime, ContainerSpec, PullError, RuntimeState};
use helios_core::{
    paths, Clock, Goal, Job, JobId, PortMapping, TaskState, TaskStatus, TaskStatusEvent, ThrottleReason,
};
use helios_coord::{CoordError, CoordinationClient, CreateMode};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-task reconciliation actor. One instance per (JobId, host); the
/// supervisor key-locks by JobId so at most one exists at a time (§4.4).
pub struct TaskRunner<C, R, K> {
    job_id: JobId,
    host: String,
    client: Arc<C>,
    runtime: Arc<R>,
    ports: Arc<Mutex<PortAllocator>>,
    clock: K,
    pull_retry_base_delay: Duration,
    pull_retry_max_delay: Duration,
    restart_backoff_ceiling: Duration,
    history_retention: usize,

    state: TaskState,
    goal: Goal,
    container_id: Option<ContainerId>,
    assigned_ports: BTreeMap<String, PortMapping>,
    env: BTreeMap<String, String>,
    pull_attempt: u32,
    restart_attempt: u32,
    next_seq: u64,
    /// Whether the entry-to-`CREATING` status (containerId null) has been
    /// published yet for the current incarnation. Cleared every time the
    /// state machine re-enters `CREATING`, so a restart publishes its own
    /// fresh `CREATING` event rather than silently skipping straight to
    /// `PULLING_IMAGE` (§4.5 table's `(start) -> CREATING` row).
    creating_published: bool,
    /// Set while throttled (transient pull retry, restart backoff);
    /// `step` is a no-op until `clock.now()` reaches it. Avoids blocking
    /// inside `step` itself so a driver loop stays responsive to goal
    /// changes and shutdown.
    ready_at: Option<Instant>,
}

impl<C, R, K> TaskRunner<C, R, K>
where
    C: CoordinationClient,
    R: ContainerRuntime,
    K: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: JobId,
        host: String,
        client: Arc<C>,
        runtime: Arc<R>,
        ports: Arc<Mutex<PortAllocator>>,
        clock: K,
        config: &crate::config::AgentConfig,
    ) -> Self {
        Self {
            job_id,
            host,
            client,
            runtime,
            ports,
            clock,
            pull_retry_base_delay: config.pull_retry_base_delay,
            pull_retry_max_delay: config.pull_retry_max_delay,
            restart_backoff_ceiling: config.restart_backoff_ceiling,
            history_retention: config.history_retention,
            state: TaskState::Creating,
            goal: Goal::Start,
            container_id: None,
            assigned_ports: BTreeMap::new(),
            env: BTreeMap::new(),
            pull_attempt: 0,
            restart_attempt: 0,
            next_seq: 0,
            creating_published: false,
            ready_at: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn container_id(&self) -> Option<&ContainerId> {
        self.container_id.as_ref()
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = goal;
    }

    /// Resumes from whatever is already published, or — absent a prior
    /// publication, e.g. after `SessionLost` wiped nothing but the Agent
    /// process itself restarted — adopts a still-running container found
    /// by its `helios.job_id` label instead of starting from scratch
    /// (§4.5 SUPPLEMENT).
    pub async fn bootstrap(&mut self) -> Result<(), TaskError> {
        self.next_seq = self.seed_next_seq().await?;

        let status_path = paths::status_host_job(&self.host, &self.job_id);
        match self.client.get(&status_path).await {
            Ok((bytes, _)) => {
                let status: TaskStatus =
                    serde_json::from_slice(&bytes).map_err(|e| TaskError::Coordination(e.to_string()))?;
                self.state = status.state;
                self.container_id = status.container_id.map(ContainerId);
                self.assigned_ports = status.ports;
                self.env = status.env;
                self.creating_published = true;
                return Ok(());
            }
            Err(CoordError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(found) = self.runtime.find_by_job_label(&self.job_id.to_string()).await? {
            tracing::info!(job_id = %self.job_id, container = %found, "adopted running container after bootstrap");
            self.container_id = Some(found.clone());
            self.state = match self.runtime.inspect(&found).await? {
                RuntimeState::Running => TaskState::Running,
                RuntimeState::Exited { .. } => TaskState::Exited,
                RuntimeState::Created | RuntimeState::Gone => TaskState::Starting,
            };
            let job = self.read_job().await?;
            self.env = job.config.env.clone();
            self.publish_status().await?;
        }
        Ok(())
    }

    async fn seed_next_seq(&self) -> Result<u64, TaskError> {
        let root = paths::history_events_root(&self.job_id, &self.host);
        match self.client.children(&root).await {
            Ok(mut names) => {
                names.sort();
                Ok(names.last().and_then(|n| n.parse::<u64>().ok()).map(|n| n + 1).unwrap_or(0))
            }
            Err(CoordError::NotFound(_)) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Runs exactly one transition-table row (§4.5). Returns `true` when a
    /// transition happened, so a driver loop may immediately call again
    /// instead of waiting out its poll interval.
    pub async fn step(&mut self) -> Result<bool, TaskError> {
        if matches!(self.goal, Goal::Stop | Goal::Undeploy)
            && !matches!(self.state, TaskState::Stopping | TaskState::Stopped)
        {
            self.ready_at = None;
            return self.begin_stopping().await;
        }

        if let Some(ready_at) = self.ready_at {
            if self.clock.now() < ready_at {
                return Ok(false);
            }
            self.ready_at = None;
        }

        match self.state {
            TaskState::Creating if !self.creating_published => self.publish_creating().await,
            TaskState::Creating => self.handle_creating().await,
            TaskState::PullingImage => self.handle_pulling_image().await,
            TaskState::Starting => self.handle_starting().await,
            TaskState::Running => self.handle_running().await,
            TaskState::Stopping => self.handle_stopping().await,
            TaskState::Exited | TaskState::Failed if self.goal == Goal::Start => {
                self.handle_restart().await
            }
            TaskState::Stopped if self.goal == Goal::Start => {
                self.reset_for_restart();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// `(start) goal=START observed -> CREATING`: publish status with a
    /// null containerId as its own discrete event (§4.5 table), before any
    /// decision about whether an image pull is needed.
    async fn publish_creating(&mut self) -> Result<bool, TaskError> {
        self.creating_published = true;
        self.publish_status().await?;
        Ok(true)
    }

    /// `CREATING -> PULLING_IMAGE` only when `image absent locally` (§4.5
    /// table); otherwise goes straight to `STARTING` without ever
    /// publishing a `PULLING_IMAGE` status or event, so a task whose image
    /// is already present produces exactly `[CREATING, STARTING, RUNNING,
    /// EXITED]` (§8 S4) rather than an always-present `PULLING_IMAGE` hop.
    async fn handle_creating(&mut self) -> Result<bool, TaskError> {
        let job = self.read_job().await?;
        if self.assigned_ports.is_empty() && !job.config.ports.is_empty() {
            self.assigned_ports = self.resolve_ports(&job.config.ports)?;
        }
        self.env = job.config.env.clone();
        if self.runtime.image_present(job.image()).await? {
            return self.begin_starting(&job).await;
        }
        self.state = TaskState::PullingImage;
        self.pull_attempt = 0;
        self.publish_status().await?;
        Ok(true)
    }

    fn resolve_ports(&self, wanted: &BTreeMap<String, PortMapping>) -> Result<BTreeMap<String, PortMapping>, TaskError> {
        let mut resolved = BTreeMap::new();
        let mut ports = self.ports.lock();
        for (label, mapping) in wanted {
            if let Some(fixed) = mapping.external_port {
                ports.reserve_fixed(fixed);
                resolved.insert(label.clone(), *mapping);
            } else {
                let assigned = ports.assign()?;
                resolved.insert(label.clone(), mapping.with_external_port(assigned));
            }
        }
        Ok(resolved)
    }

    async fn handle_pulling_image(&mut self) -> Result<bool, TaskError> {
        let job = self.read_job().await?;
        if self.runtime.image_present(job.image()).await? {
            return self.begin_starting(&job).await;
        }

        match self.runtime.pull_image(job.image()).await {
            Ok(()) => self.begin_starting(&job).await,
            Err(PullError::Transient(_, msg)) => {
                let delay = backoff_delay(self.pull_attempt, self.pull_retry_base_delay, self.pull_retry_max_delay);
                self.pull_attempt += 1;
                self.ready_at = Some(self.clock.now() + delay);
                self.append_event().await?;
                tracing::warn!(job_id = %self.job_id, attempt = self.pull_attempt, %msg, "transient pull failure, retrying");
                Ok(true)
            }
            Err(PullError::Permanent(_, msg)) => {
                self.state = TaskState::Failed;
                self.publish_status_with(|s| s.throttled = Some(ThrottleReason::ImageMissing)).await?;
                tracing::error!(job_id = %self.job_id, %msg, "permanent image pull failure");
                Ok(true)
            }
        }
    }

    async fn begin_starting(&mut self, job: &Job) -> Result<bool, TaskError> {
        let spec = ContainerSpec {
            job_id_label: self.job_id.to_string(),
            image: job.image().to_string(),
            command: job.config.command.clone(),
            env: job.config.env.clone(),
            ports: self.assigned_ports.clone(),
        };
        let id = self.runtime.create_container(spec).await?;
        self.container_id = Some(id);
        self.state = TaskState::Starting;
        self.publish_status().await?;
        Ok(true)
    }

    async fn handle_starting(&mut self) -> Result<bool, TaskError> {
        let Some(id) = self.container_id.clone() else {
            self.reset_for_restart();
            return Ok(true);
        };
        self.runtime.start_container(&id).await?;
        self.state = TaskState::Running;
        self.restart_attempt = 0;
        self.publish_status().await?;
        Ok(true)
    }

    async fn handle_running(&mut self) -> Result<bool, TaskError> {
        let Some(id) = self.container_id.clone() else {
            self.reset_for_restart();
            return Ok(true);
        };
        match self.runtime.inspect(&id).await? {
            RuntimeState::Exited { .. } | RuntimeState::Gone => {
                self.state = TaskState::Exited;
                self.publish_status().await?;
                Ok(true)
            }
            RuntimeState::Running | RuntimeState::Created => Ok(false),
        }
    }

    async fn begin_stopping(&mut self) -> Result<bool, TaskError> {
        self.state = TaskState::Stopping;
        if let Some(id) = self.container_id.clone() {
            self.runtime.stop_container(&id).await?;
        }
        self.publish_status().await?;
        Ok(true)
    }

    async fn handle_stopping(&mut self) -> Result<bool, TaskError> {
        let Some(id) = self.container_id.clone() else {
            self.state = TaskState::Stopped;
            self.publish_status().await?;
            return Ok(true);
        };
        match self.runtime.inspect(&id).await {
            Ok(RuntimeState::Gone) | Err(crate::runtime::RuntimeError::NotFound(_)) => {
                self.state = TaskState::Stopped;
                self.publish_status().await?;
                if self.goal == Goal::Undeploy {
                    self.garbage_collect().await?;
                }
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// `STOPPING -> (removed)`: release held ports and delete the
    /// published status node (§4.5 table's UNDEPLOY row).
    async fn garbage_collect(&mut self) -> Result<(), TaskError> {
        let mut ports = self.ports.lock();
        for mapping in self.assigned_ports.values() {
            if let Some(port) = mapping.external_port {
                ports.release(port);
            }
        }
        drop(ports);
        let path = paths::status_host_job(&self.host, &self.job_id);
        match self.client.delete(&path, None).await {
            Ok(()) | Err(CoordError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Restart policy on `EXITED`/`FAILED` (§4.5): automatic restart with
    /// exponential backoff up to `restart_backoff_ceiling`, `throttled`
    /// set while backing off.
    async fn handle_restart(&mut self) -> Result<bool, TaskError> {
        let delay = backoff_delay(self.restart_attempt, Duration::from_millis(500), self.restart_backoff_ceiling);
        self.restart_attempt += 1;
        self.ready_at = Some(self.clock.now() + delay);
        self.publish_status_with(|s| s.throttled = Some(ThrottleReason::RestartBackoff)).await?;
        self.reset_for_restart();
        Ok(true)
    }

    fn reset_for_restart(&mut self) {
        self.state = TaskState::Creating;
        self.container_id = None;
        self.creating_published = false;
    }

    async fn read_job(&self) -> Result<Job, TaskError> {
        let (bytes, _) = self.client.get(&paths::job(&self.job_id)).await?;
        serde_json::from_slice(&bytes).map_err(|e| TaskError::Coordination(e.to_string()))
    }

    fn current_status(&self) -> TaskStatus {
        let mut status = TaskStatus::new(self.job_id.clone(), self.state);
        if let Some(id) = &self.container_id {
            status = status.with_container_id(id.to_string());
        }
        status.with_ports(self.assigned_ports.clone()).with_env(self.env.clone())
    }

    async fn publish_status(&mut self) -> Result<(), TaskError> {
        self.publish_status_with(|_| {}).await
    }

    async fn publish_status_with(&mut self, mutate: impl FnOnce(&mut TaskStatus)) -> Result<(), TaskError> {
        let mut status = self.current_status();
        mutate(&mut status);
        let path = paths::status_host_job(&self.host, &self.job_id);
        let bytes = serde_json::to_vec(&status).map_err(|e| TaskError::Coordination(e.to_string()))?;
        self.client.ensure_path(&paths::status_host_jobs_root(&self.host)).await?;
        match self.client.set(&path, bytes.clone()).await {
            Ok(_) => {}
            Err(CoordError::NotFound(_)) => {
                self.client.create(&path, bytes, CreateMode::Persistent).await?;
            }
            Err(e) => return Err(e.into()),
        }
        self.append_event_with(status).await
    }

    async fn append_event(&mut self) -> Result<(), TaskError> {
        let status = self.current_status();
        self.append_event_with(status).await
    }

    /// Appends a [`TaskStatusEvent`] and prunes the trail down to
    /// `history_retention` entries (§9 open question resolution).
    async fn append_event_with(&mut self, status: TaskStatus) -> Result<(), TaskError> {
        let root = paths::history_events_root(&self.job_id, &self.host);
        self.client.ensure_path(&root).await?;
        let event = TaskStatusEvent::new(status, self.clock.epoch_ms());
        let seq = self.next_seq;
        self.next_seq += 1;
        let path = paths::history_event(&self.job_id, &self.host, seq);
        let bytes = serde_json::to_vec(&event).map_err(|e| TaskError::Coordination(e.to_string()))?;
        self.client.create(&path, bytes, CreateMode::Persistent).await?;
        self.prune_history(&root).await
    }

    async fn prune_history(&self, root: &str) -> Result<(), TaskError> {
        let mut names = self.client.children(root).await?;
        if names.len() <= self.history_retention {
            return Ok(());
        }
        names.sort();
        let excess = names.len() - self.history_retention;
        for name in &names[..excess] {
            let path = format!("{root}/{name}");
            match self.client.delete(&path, None).await {
                Ok(()) | Err(CoordError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// `base * 2^attempt`, capped at `ceiling` — shared by the pull-retry and
/// restart-backoff policies (§4.5).
fn backoff_delay(attempt: u32, base: Duration, ceiling: Duration) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16)).min(ceiling)
}

#[cfg(test)]
#[path = "task_runner_tests.rs"]
mod tests;
