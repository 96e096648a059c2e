// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Deploy` (§4.3): "implemented as a single transaction: assert job
//! exists, assert deployment absent, write deployment node."

use crate::{Master, MasterError};
use helios_core::{paths, Deployment};
use helios_coord::{CoordError, CoordinationClient, CreateMode, Op};
use helios_wire::DeployRequest;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "Deploy"))]
    pub async fn deploy(&self, req: DeployRequest) -> Result<(), MasterError> {
        let DeployRequest { job_id, host, goal } = req;
        self.assert_host_registered(&host).await?;

        match self.client.get(&paths::job(&job_id)).await {
            Ok(_) => {}
            Err(CoordError::NotFound(_)) => return Err(MasterError::JobNotFound(job_id.to_string())),
            Err(e) => return Err(e.into()),
        }

        let config_path = paths::config_host_job(&host, &job_id);
        match self.client.get(&config_path).await {
            Ok(_) => return Err(MasterError::AlreadyDeployed { job: job_id.to_string(), host }),
            Err(CoordError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.client.ensure_path(&paths::config_host_jobs_root(&host)).await?;
        self.client.ensure_path(&paths::job_ref_root(&job_id)).await?;

        let deployment = Deployment::new(job_id.clone(), host.clone(), goal);
        let bytes = serde_json::to_vec(&deployment).map_err(|e| MasterError::Unavailable(e.to_string()))?;

        let ops = vec![
            Op::check_exists(paths::job(&job_id)),
            Op::check_absent(config_path.clone()),
            Op::create(config_path, bytes, CreateMode::Persistent),
            Op::create(paths::job_ref(&job_id, &host), Vec::new(), CreateMode::Persistent),
        ];
        self.client.transaction(ops).await?;
        tracing::info!(job_id = %job_id, host = %host, ?goal, "deployed job");
        Ok(())
    }

    /// Strict-by-default per §9 open question: a host that has never
    /// published `/status/hosts/<host>/info` is treated as unregistered
    /// unless `allow_unregistered_hosts` opts in to pending future
    /// deployments.
    pub(crate) async fn assert_host_registered(&self, host: &str) -> Result<(), MasterError> {
        if self.config.allow_unregistered_hosts {
            return Ok(());
        }
        match self.client.get(&paths::status_host_info(host)).await {
            Ok(_) => Ok(()),
            Err(CoordError::NotFound(_)) => Err(MasterError::HostNotRegistered(host.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
