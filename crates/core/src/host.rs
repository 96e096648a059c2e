// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-level status aggregated by the Master from `/status/hosts/<host>/*`.

use crate::job_id::JobId;
use crate::task::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `UP` ⇔ the ephemeral `/status/hosts/<host>/up` node is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatusKind {
    Up,
    Down,
}

crate::simple_display! {
    HostStatusKind {
        Up => "UP",
        Down => "DOWN",
    }
}

/// Agent identity published at `/status/hosts/<host>/info` alongside
/// [`RuntimeInfo`]. Republished whenever either changes (§3 SUPPLEMENT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub version: String,
    pub start_time_ms: u64,
}

/// Container runtime identity the Agent reports alongside [`AgentInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub runtime_name: String,
    pub runtime_version: String,
}

/// The persistent payload the Agent writes (and republishes on change) at
/// `/status/hosts/<host>/info`: identity plus free-form environment facts,
/// folded into one node because they are read together by every `HostStatus`
/// query even though they are updated independently (§3 SUPPLEMENT).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostInfoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_info: Option<AgentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_info: Option<RuntimeInfo>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// Aggregate view of one host, as the Master assembles it for `HostStatus`
/// RPC responses: liveness plus every TaskStatus the Agent has published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStatus {
    pub status: HostStatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_info: Option<AgentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_info: Option<RuntimeInfo>,
    /// JobIds with a Deployment on this host.
    #[serde(default)]
    pub jobs: Vec<JobId>,
    /// job id (bare string) -> TaskStatus, as published by the Agent.
    #[serde(default)]
    pub statuses: BTreeMap<String, TaskStatus>,
    /// Free-form host environment info (OS, arch, ...), set by the Agent.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl HostStatus {
    /// A host with no published `up` node: everything else is stale/unknown.
    pub fn down() -> Self {
        Self {
            status: HostStatusKind::Down,
            agent_info: None,
            runtime_info: None,
            jobs: Vec::new(),
            statuses: BTreeMap::new(),
            environment: BTreeMap::new(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HostStatusKind::Up
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
