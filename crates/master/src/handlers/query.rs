// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GetJob` / `ListJobs` (§4.3): read-only queries, safe to retry
//! internally since they have no side effects (§7).

use crate::{Master, MasterError};
use helios_core::{paths, Job, JobId};
use helios_coord::{with_retry, CoordError, CoordinationClient, RetryPolicy};
use helios_wire::{GetJobRequest, ListJobsRequest};

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "GetJob"))]
    pub async fn get_job(&self, req: GetJobRequest) -> Result<Job, MasterError> {
        self.read_job(&req.job_id).await
    }

    #[tracing::instrument(skip(self, req), fields(op = "ListJobs"))]
    pub async fn list_jobs(&self, req: ListJobsRequest) -> Result<Vec<Job>, MasterError> {
        let names = with_retry(RetryPolicy::default(), || self.client.children(&paths::jobs_root())).await?;
        let mut jobs = Vec::with_capacity(names.len());
        for name in names {
            let job_id = JobId::parse(&name)?;
            let job = self.read_job(&job_id).await?;
            if let Some(filter) = &req.name {
                if job.name() != filter {
                    continue;
                }
            }
            jobs.push(job);
        }
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(jobs)
    }

    async fn read_job(&self, job_id: &JobId) -> Result<Job, MasterError> {
        let (bytes, _version) = match self.client.get(&paths::job(job_id)).await {
            Ok(v) => v,
            Err(CoordError::NotFound(_)) => return Err(MasterError::JobNotFound(job_id.to_string())),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| MasterError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
