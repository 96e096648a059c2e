// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SetGoal` (§4.3): overwrites the goal of an existing Deployment in
//! place. Distinct from `Undeploy`, which removes the Deployment record
//! entirely — `SetGoal(.., Goal::Undeploy)` instead leaves the record in
//! place with `goal = UNDEPLOY` so the owning Agent can drive the Task
//! State Machine's `STOPPING -> (removed)` transition (§4.5) and garbage
//! collect local state before the Master ever deletes the record (see
//! `DESIGN.md`'s "Undeploy vs SetGoal(UNDEPLOY)" entry).

use crate::{Master, MasterError};
use helios_core::paths;
use helios_coord::{CoordError, CoordinationClient};
use helios_wire::SetGoalRequest;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "SetGoal"))]
    pub async fn set_goal(&self, req: SetGoalRequest) -> Result<(), MasterError> {
        let SetGoalRequest { job_id, host, goal } = req;
        self.assert_host_registered(&host).await?;

        let config_path = paths::config_host_job(&host, &job_id);
        let (_, version) = match self.client.get(&config_path).await {
            Ok(v) => v,
            Err(CoordError::NotFound(_)) => {
                return Err(MasterError::DeploymentNotFound { job: job_id.to_string(), host })
            }
            Err(e) => return Err(e.into()),
        };
        let _ = version;

        let deployment = helios_core::Deployment::new(job_id.clone(), host.clone(), goal);
        let bytes = serde_json::to_vec(&deployment).map_err(|e| MasterError::Unavailable(e.to_string()))?;
        self.client.set(&config_path, bytes).await?;
        tracing::info!(job_id = %job_id, host = %host, ?goal, "set deployment goal");
        Ok(())
    }
}

#[cfg(test)]
#[path = "set_goal_tests.rs"]
mod tests;
