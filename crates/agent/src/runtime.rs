// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ContainerRuntime`]: the trait boundary to the out-of-scope container
//! runtime daemon (§1, §4.5). The real Docker/containerd/K8s backend is a
//! separate collaborator injected behind this trait, the same way the
//! teacher workspace's `RuntimeRouter` injects an `AgentAdapter`
//! (`daemon/src/adapters/agent/router.rs`) in front of Docker/K8s/local
//! backends.

use async_trait::async_trait;
use helios_core::PortMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

/// Label the Runner sets at container-create time and reads back to adopt
/// a running container after `SessionLost` (§4.5 SUPPLEMENT).
pub const JOB_ID_LABEL: &str = "helios.job_id";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the Runner asks the runtime to create. Ports carry their resolved
/// external assignment — the Agent's port allocator (§4.4) fills it in
/// before this spec is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub job_id_label: String,
    pub image: String,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub ports: BTreeMap<String, PortMapping>,
}

/// Observed runtime state of a created container (§4.5: "create container,
/// start, container exits").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Created,
    Running,
    Exited { exit_code: i32 },
    Gone,
}

#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("no such container: {0}")]
    NotFound(String),
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of [`ContainerRuntime::pull_image`] (§4.5 transition table:
/// `PULLING_IMAGE` distinguishes transient-retry from permanent failure).
#[derive(Debug, Clone, Error)]
pub enum PullError {
    #[error("transient registry failure pulling {0}: {1}")]
    Transient(String, String),
    #[error("image {0} does not exist: {1}")]
    Permanent(String, String),
}

/// The out-of-scope container runtime's interface, as the Task State
/// Machine (§4.5) drives it. One production-shaped implementation
/// (Docker, containerd, K8s) would sit behind this trait in a real
/// deployment; this workspace ships [`fake::FakeContainerRuntime`] as the
/// reference/test backend, grounded on the teacher's
/// `daemon/src/adapters/agent/docker` shelling-out pattern generalized to
/// a trait object.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    async fn image_present(&self, image: &str) -> Result<bool, RuntimeError>;

    async fn pull_image(&self, image: &str) -> Result<(), PullError>;

    async fn create_container(&self, spec: ContainerSpec) -> Result<ContainerId, RuntimeError>;

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    /// Sends a stop signal; does not block until the container is gone —
    /// callers poll [`Self::inspect`] for that (§4.5: STOPPING -> STOPPED
    /// "container gone").
    async fn stop_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    async fn remove_container(&self, id: &ContainerId) -> Result<(), RuntimeError>;

    async fn inspect(&self, id: &ContainerId) -> Result<RuntimeState, RuntimeError>;

    /// Finds a container by the [`JOB_ID_LABEL`] label, used to adopt a
    /// still-running container after `SessionLost` instead of restarting
    /// from scratch (§4.5 SUPPLEMENT).
    async fn find_by_job_label(&self, job_id: &str) -> Result<Option<ContainerId>, RuntimeError>;

    fn runtime_name(&self) -> &str;

    fn runtime_version(&self) -> &str;
}
