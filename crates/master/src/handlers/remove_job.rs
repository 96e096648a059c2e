// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RemoveJob` (§4.3): a Job may be removed only once nothing references
//! it (invariant (a): a Deployment may exist only when its Job exists, so
//! removing a still-deployed Job would violate it).

use crate::{Master, MasterError};
use helios_core::paths;
use helios_coord::{CoordError, CoordinationClient};
use helios_wire::RemoveJobRequest;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "RemoveJob"))]
    pub async fn remove_job(&self, req: RemoveJobRequest) -> Result<(), MasterError> {
        let path = paths::job(&req.job_id);
        match self.client.get(&path).await {
            Ok(_) => {}
            Err(CoordError::NotFound(_)) => return Err(MasterError::JobNotFound(req.job_id.to_string())),
            Err(e) => return Err(e.into()),
        }

        let refs = match self.client.children(&paths::job_ref_root(&req.job_id)).await {
            Ok(children) => children,
            Err(CoordError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if !refs.is_empty() {
            return Err(MasterError::JobStillDeployed(req.job_id.to_string()));
        }

        match self.client.delete(&path, None).await {
            Ok(()) => {
                tracing::info!(job_id = %req.job_id, "removed job");
                Ok(())
            }
            Err(CoordError::NotFound(_)) => Err(MasterError::JobNotFound(req.job_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "remove_job_tests.rs"]
mod tests;
