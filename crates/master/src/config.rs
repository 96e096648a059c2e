// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Master configuration. Env-var-first with sensible defaults, mirroring
//! the teacher workspace's `daemon/src/env.rs` layering
//! (`HELIOS_*` env var, else a hardcoded default — no required
//! configuration beyond the coordination store endpoint list, per §6).

use std::net::SocketAddr;

/// Default bound history per (JobId, host), per §9 open question
/// resolution: "30 most recent per host".
pub const DEFAULT_HISTORY_RETENTION: usize = 30;

#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Coordination store endpoint list (§6's only required configuration).
    /// Unused by the in-memory `MemoryStore` backend this workspace ships,
    /// but threaded through so a real backend can be swapped in without an
    /// API change.
    pub coordination_endpoints: Vec<String>,
    pub bind_addr: SocketAddr,
    /// Strict-by-default per §9 open question: `Deploy` to a host that has
    /// never registered fails with `HostNotRegistered` unless this is set.
    pub allow_unregistered_hosts: bool,
    pub history_retention: usize,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            coordination_endpoints: Vec::new(),
            bind_addr: "127.0.0.1:4610".parse().expect("valid default bind addr"),
            allow_unregistered_hosts: false,
            history_retention: DEFAULT_HISTORY_RETENTION,
        }
    }
}

impl MasterConfig {
    /// Load configuration from `HELIOS_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(endpoints) = std::env::var("HELIOS_COORD_ENDPOINTS") {
            cfg.coordination_endpoints = endpoints.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(bind) = std::env::var("HELIOS_MASTER_BIND") {
            if let Ok(addr) = bind.parse() {
                cfg.bind_addr = addr;
            }
        }
        if let Ok(flag) = std::env::var("HELIOS_ALLOW_UNREGISTERED_HOSTS") {
            cfg.allow_unregistered_hosts = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Ok(retention) = std::env::var("HELIOS_HISTORY_RETENTION") {
            if let Ok(n) = retention.parse() {
                cfg.history_retention = n;
            }
        }
        cfg
    }
}
