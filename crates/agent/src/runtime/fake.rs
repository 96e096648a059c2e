// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`ContainerRuntime`] reference backend, grounded on the
//! teacher's `FakeAgentAdapter` (`daemon/src/adapters/agent/mod.rs`'s
//! `#[cfg(test)] mod fake`) test-double pattern: a `Mutex`-guarded state
//! map plus scriptable failure injection, with no real process or
//! container runtime behind it.

use super::{ContainerId, ContainerSpec, PullError, RuntimeError, RuntimeState};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct FakeContainer {
    spec: ContainerSpec,
    state: RuntimeState,
}

#[derive(Default)]
struct Inner {
    images: HashSet<String>,
    /// Images that fail to pull `n` more times (transiently) before
    /// succeeding. Not present => succeeds immediately if in `images`,
    /// or is pulled successfully the first time it's asked for.
    transient_pull_failures: HashMap<String, u32>,
    /// Images that always fail to pull (404-from-registry style).
    permanently_missing: HashSet<String>,
    containers: HashMap<ContainerId, FakeContainer>,
}

/// A scriptable, in-process [`super::ContainerRuntime`] used by
/// `helios-agent`'s own tests and exercised by the root workspace
/// integration suite (S3/S4/S6) in place of a real Docker/K8s daemon.
#[derive(Clone, Default)]
pub struct FakeContainerRuntime {
    inner: Arc<Mutex<Inner>>,
    next_id: Arc<AtomicU64>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds an image as already present locally (skips `PULLING_IMAGE`).
    pub fn with_image(self, image: impl Into<String>) -> Self {
        self.inner.lock().images.insert(image.into());
        self
    }

    /// The next `n` pull attempts for `image` fail transiently before the
    /// following one succeeds.
    pub fn fail_pull_transiently(&self, image: impl Into<String>, n: u32) {
        self.inner.lock().transient_pull_failures.insert(image.into(), n);
    }

    /// `image` never exists in the registry (permanent pull failure).
    pub fn mark_image_missing(&self, image: impl Into<String>) {
        self.inner.lock().permanently_missing.insert(image.into());
    }

    /// Simulates the container process exiting on its own (as if the
    /// workload finished), for tests driving `RUNNING -> EXITED`.
    pub fn simulate_exit(&self, id: &ContainerId, exit_code: i32) {
        if let Some(c) = self.inner.lock().containers.get_mut(id) {
            c.state = RuntimeState::Exited { exit_code };
        }
    }

    pub fn container_count(&self) -> usize {
        self.inner.lock().containers.len()
    }
}

#[async_trait]
impl super::ContainerRuntime for FakeContainerRuntime {
    async fn image_present(&self, image: &str) -> Result<bool, RuntimeError> {
        Ok(self.inner.lock().images.contains(image))
    }

    async fn pull_image(&self, image: &str) -> Result<(), PullError> {
        let mut inner = self.inner.lock();
        if inner.permanently_missing.contains(image) {
            return Err(PullError::Permanent(image.to_string(), "manifest unknown".to_string()));
        }
        if let Some(remaining) = inner.transient_pull_failures.get_mut(image) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(PullError::Transient(image.to_string(), "registry timeout".to_string()));
            }
        }
        inner.images.insert(image.to_string());
        Ok(())
    }

    async fn create_container(&self, spec: ContainerSpec) -> Result<ContainerId, RuntimeError> {
        let mut inner = self.inner.lock();
        if !inner.images.contains(&spec.image) {
            return Err(RuntimeError::Unavailable(format!("image {} not pulled", spec.image)));
        }
        let id = ContainerId(format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        inner.containers.insert(id.clone(), FakeContainer { spec, state: RuntimeState::Created });
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        let c = inner.containers.get_mut(id).ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        c.state = RuntimeState::Running;
        Ok(())
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        let c = inner.containers.get_mut(id).ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        c.state = RuntimeState::Gone;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.containers.remove(id).ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        Ok(())
    }

    async fn inspect(&self, id: &ContainerId) -> Result<RuntimeState, RuntimeError> {
        let inner = self.inner.lock();
        let c = inner.containers.get(id).ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        Ok(c.state)
    }

    async fn find_by_job_label(&self, job_id: &str) -> Result<Option<ContainerId>, RuntimeError> {
        let inner = self.inner.lock();
        Ok(inner
            .containers
            .iter()
            .find(|(_, c)| c.spec.job_id_label == job_id && !matches!(c.state, RuntimeState::Gone))
            .map(|(id, _)| id.clone()))
    }

    fn runtime_name(&self) -> &str {
        "fake"
    }

    fn runtime_version(&self) -> &str {
        "0"
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
