// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CreateJob` (§4.3): validate + hash, then an idempotent create.

use crate::{Master, MasterError};
use helios_core::{paths, Job};
use helios_coord::{CoordError, CoordinationClient, CreateMode};
use helios_wire::CreateJobRequest;

impl<C: CoordinationClient> Master<C> {
    /// Computes the JobId from `req.config`, rejecting a mismatched
    /// `req.hash` (§4.1 step 3-4, §4.3). Creating a Job with an existing
    /// JobId and identical config is a no-op; the same id can never carry a
    /// different config, since the id is derived from it (§4.3).
    #[tracing::instrument(skip(self, req), fields(op = "CreateJob"))]
    pub async fn create_job(&self, req: CreateJobRequest) -> Result<helios_core::JobId, MasterError> {
        let job = req.config.build(req.hash.as_deref())?;
        let path = paths::job(&job.id);
        let bytes = serde_json::to_vec(&job).map_err(|e| MasterError::Unavailable(e.to_string()))?;

        self.client.ensure_path(&paths::jobs_root()).await?;
        match self.client.create(&path, bytes, CreateMode::Persistent).await {
            Ok(()) => {
                tracing::info!(job_id = %job.id, "created job");
                Ok(job.id)
            }
            Err(CoordError::Exists(_)) => {
                let (existing_bytes, _version) = self.client.get(&path).await?;
                let existing: Job = serde_json::from_slice(&existing_bytes)
                    .map_err(|e| MasterError::Unavailable(e.to_string()))?;
                if existing.config == job.config {
                    tracing::debug!(job_id = %job.id, "create_job idempotent no-op");
                    Ok(job.id)
                } else {
                    Err(MasterError::JobExists(job.id.to_string()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "create_job_tests.rs"]
mod tests;
