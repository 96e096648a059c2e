// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HostStatus` (§4.3): aggregates the ephemeral `up` node, the persistent
//! info node, the desired-deployment set, and every published TaskStatus
//! for one host.

use crate::{Master, MasterError};
use helios_core::{paths, HostInfoRecord, HostStatus, HostStatusKind, JobId, TaskStatus};
use helios_coord::{CoordError, CoordinationClient};
use helios_wire::HostStatusRequest;
use std::collections::BTreeMap;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "HostStatus"))]
    pub async fn host_status(&self, req: HostStatusRequest) -> Result<HostStatus, MasterError> {
        let host = &req.host;

        let is_up = match self.client.get(&paths::status_host_up(host)).await {
            Ok(_) => true,
            Err(CoordError::NotFound(_)) => false,
            Err(e) => return Err(e.into()),
        };

        let info = match self.client.get(&paths::status_host_info(host)).await {
            Ok((bytes, _)) => {
                Some(serde_json::from_slice::<HostInfoRecord>(&bytes).map_err(|e| MasterError::Unavailable(e.to_string()))?)
            }
            Err(CoordError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let job_names = match self.client.children(&paths::config_host_jobs_root(host)).await {
            Ok(names) => names,
            Err(CoordError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if !is_up && info.is_none() && job_names.is_empty() {
            return Err(MasterError::HostNotFound(host.clone()));
        }

        let mut jobs = Vec::with_capacity(job_names.len());
        for name in &job_names {
            jobs.push(JobId::parse(name)?);
        }
        jobs.sort();

        let status_names = match self.client.children(&paths::status_host_jobs_root(host)).await {
            Ok(names) => names,
            Err(CoordError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let mut statuses = BTreeMap::new();
        for name in status_names {
            let (bytes, _) = self.client.get(&paths::status_host_job(host, &JobId::parse(&name)?)).await?;
            let status: TaskStatus = serde_json::from_slice(&bytes).map_err(|e| MasterError::Unavailable(e.to_string()))?;
            statuses.insert(name, status);
        }

        let info = info.unwrap_or_default();
        Ok(HostStatus {
            status: if is_up { HostStatusKind::Up } else { HostStatusKind::Down },
            agent_info: info.agent_info,
            runtime_info: info.runtime_info,
            jobs,
            statuses,
            environment: info.environment,
        })
    }
}

#[cfg(test)]
#[path = "host_status_tests.rs"]
mod tests;
