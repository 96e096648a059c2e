// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::MasterConfig;
use helios_core::{JobConfig, TaskState, TaskStatus, TaskStatusEvent};
use helios_coord::{CreateMode, MemoryStore};
use helios_wire::{CreateJobRequest, JobHistoryRequest};

#[tokio::test]
async fn fails_for_an_unknown_job() {
    let store = MemoryStore::new();
    let master = Master::new(std::sync::Arc::new(store.session()), MasterConfig::default());
    let job_id = helios_core::JobId::new("nope", "1", Some("0".repeat(40)));
    let err = master.job_history(JobHistoryRequest { job_id }).await.unwrap_err();
    assert!(matches!(err, MasterError::JobNotFound(_)));
}

#[tokio::test]
async fn empty_history_is_not_an_error() {
    let store = MemoryStore::new();
    let master = Master::new(std::sync::Arc::new(store.session()), MasterConfig::default());
    let id = master
        .create_job(CreateJobRequest { config: JobConfig::new("svc", "1", "img"), hash: None })
        .await
        .unwrap();
    let history = master.job_history(JobHistoryRequest { job_id: id }).await.unwrap();
    assert!(history.is_empty());
}

/// S4 — the history trail, after skipping leading `PULLING_IMAGE` events,
/// is exactly `[CREATING, STARTING, RUNNING, EXITED]`.
#[tokio::test]
async fn aggregates_events_across_hosts_sorted_by_timestamp() {
    let store = MemoryStore::new();
    let master = Master::new(std::sync::Arc::new(store.session()), MasterConfig::default());
    let id = master
        .create_job(CreateJobRequest { config: JobConfig::new("svc", "1", "img"), hash: None })
        .await
        .unwrap();

    let sequence = [
        (TaskState::Creating, None, 1u64),
        (TaskState::Starting, Some("c1"), 2u64),
        (TaskState::Running, Some("c1"), 3u64),
        (TaskState::Exited, Some("c1"), 4u64),
    ];
    for (i, (state, container, ts)) in sequence.iter().enumerate() {
        let mut status = TaskStatus::new(id.clone(), *state);
        if let Some(c) = container {
            status = status.with_container_id(*c);
        }
        let event = TaskStatusEvent::new(status, *ts);
        let path = helios_core::paths::history_event(&id, "host-a", i as u64);
        master.client.ensure_path(&helios_core::paths::history_events_root(&id, "host-a")).await.unwrap();
        master.client.create(&path, serde_json::to_vec(&event).unwrap(), CreateMode::Persistent).await.unwrap();
    }

    let history = master.job_history(JobHistoryRequest { job_id: id }).await.unwrap();
    let states: Vec<_> = history.iter().map(|e| e.status.state).collect();
    assert_eq!(
        states,
        vec![TaskState::Creating, TaskState::Starting, TaskState::Running, TaskState::Exited]
    );
    assert_eq!(history[0].status.container_id, None);
    assert_eq!(history[1].status.container_id, Some("c1".to_string()));
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}
