// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Undeploy` (§4.3): removes the Deployment record and its job-ref marker
//! transactionally. The owning Agent observes the disappearance through
//! its children-watch on `/config/hosts/<host>/jobs` and reacts per §4.4's
//! reconciliation policy ("for each running Task Runner without a
//! corresponding desired entry: stop it").

use crate::{Master, MasterError};
use helios_core::paths;
use helios_coord::{CoordError, CoordinationClient, Op};
use helios_wire::UndeployRequest;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "Undeploy"))]
    pub async fn undeploy(&self, req: UndeployRequest) -> Result<(), MasterError> {
        let UndeployRequest { job_id, host } = req;
        let config_path = paths::config_host_job(&host, &job_id);
        match self.client.get(&config_path).await {
            Ok(_) => {}
            Err(CoordError::NotFound(_)) => {
                return Err(MasterError::DeploymentNotFound { job: job_id.to_string(), host })
            }
            Err(e) => return Err(e.into()),
        }

        let ref_path = paths::job_ref(&job_id, &host);
        let mut ops = vec![Op::delete(config_path, None)];
        if self.client.get(&ref_path).await.is_ok() {
            ops.push(Op::delete(ref_path, None));
        }
        self.client.transaction(ops).await?;
        tracing::info!(job_id = %job_id, host = %host, "undeployed job");
        Ok(())
    }
}

#[cfg(test)]
#[path = "undeploy_tests.rs"]
mod tests;
