// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration. Env-var-first with sensible defaults, mirroring
//! `helios-master::config` and, further back, the teacher workspace's
//! `daemon/src/env.rs` layering.

use std::time::Duration;

/// Default dynamic external-port range an Agent draws from when a
/// PortMapping has no fixed `external_port` (§4.4).
pub const DEFAULT_PORT_RANGE: (u16, u16) = (30000, 40000);

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// This Agent's host name, the key under `/status/hosts/<host>` and
    /// `/config/hosts/<host>` (§6).
    pub host: String,
    /// Coordination store endpoint list (§6's only required configuration
    /// beyond the runtime endpoint). Unused by the in-memory `MemoryStore`
    /// backend this workspace ships.
    pub coordination_endpoints: Vec<String>,
    /// Container-runtime endpoint (§6), passed through to whichever
    /// `ContainerRuntime` implementation is wired in `main`.
    pub runtime_endpoint: String,
    pub dynamic_port_range: (u16, u16),
    /// Base delay for `PULLING_IMAGE` transient-retry backoff (§4.5).
    pub pull_retry_base_delay: Duration,
    pub pull_retry_max_delay: Duration,
    /// Ceiling for the `EXITED`/`FAILED` restart-backoff policy (§4.5).
    pub restart_backoff_ceiling: Duration,
    /// Poll interval used while waiting on a runtime-observed transition
    /// (image pull completion, container exit, stop completion) — the
    /// "explicit timers" suspension point named in §5.
    pub poll_interval: Duration,
    /// Bound on `TaskStatusEvent`s retained per (JobId, host) (§9 open
    /// question resolution, mirrored from `MasterConfig::history_retention`
    /// since the Agent is the one actually appending and pruning them).
    pub history_retention: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            coordination_endpoints: Vec::new(),
            runtime_endpoint: String::new(),
            dynamic_port_range: DEFAULT_PORT_RANGE,
            pull_retry_base_delay: Duration::from_millis(200),
            pull_retry_max_delay: Duration::from_secs(30),
            restart_backoff_ceiling: Duration::from_secs(60),
            poll_interval: Duration::from_millis(250),
            history_retention: 30,
        }
    }
}

impl AgentConfig {
    /// Load configuration from `HELIOS_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("HELIOS_AGENT_HOST") {
            cfg.host = host;
        }
        if let Ok(endpoints) = std::env::var("HELIOS_COORD_ENDPOINTS") {
            cfg.coordination_endpoints =
                endpoints.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(endpoint) = std::env::var("HELIOS_RUNTIME_ENDPOINT") {
            cfg.runtime_endpoint = endpoint;
        }
        if let Ok(range) = std::env::var("HELIOS_DYNAMIC_PORT_RANGE") {
            if let Some((lo, hi)) = range.split_once('-') {
                if let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse()) {
                    cfg.dynamic_port_range = (lo, hi);
                }
            }
        }
        cfg
    }

    pub fn port_range(&self) -> std::ops::RangeInclusive<u16> {
        self.dynamic_port_range.0..=self.dynamic_port_range.1
    }
}
