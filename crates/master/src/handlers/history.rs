// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `JobHistory` (§4.3): "aggregate children of
//! `/history/jobs/<jobId>/hosts/*` sorted by timestamp."

use crate::{Master, MasterError};
use helios_core::{paths, TaskStatusEvent};
use helios_coord::{CoordError, CoordinationClient};
use helios_wire::JobHistoryRequest;

impl<C: CoordinationClient> Master<C> {
    #[tracing::instrument(skip(self, req), fields(op = "JobHistory"))]
    pub async fn job_history(&self, req: JobHistoryRequest) -> Result<Vec<TaskStatusEvent>, MasterError> {
        let job_id = &req.job_id;
        match self.client.get(&paths::job(job_id)).await {
            Ok(_) => {}
            Err(CoordError::NotFound(_)) => return Err(MasterError::JobNotFound(job_id.to_string())),
            Err(e) => return Err(e.into()),
        }

        let hosts = match self.client.children(&paths::history_job_hosts_root(job_id)).await {
            Ok(hosts) => hosts,
            Err(CoordError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for host in hosts {
            let events_root = paths::history_events_root(job_id, &host);
            let mut seqs = match self.client.children(&events_root).await {
                Ok(seqs) => seqs,
                Err(CoordError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            seqs.sort();
            for seq in seqs {
                let path = format!("{events_root}/{seq}");
                let (bytes, _) = self.client.get(&path).await?;
                let event: TaskStatusEvent =
                    serde_json::from_slice(&bytes).map_err(|e| MasterError::Unavailable(e.to_string()))?;
                events.push(event);
            }
        }
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
