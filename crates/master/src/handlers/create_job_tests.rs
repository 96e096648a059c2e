// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::MasterConfig;
use helios_core::JobConfig;
use helios_coord::MemoryStore;
use helios_wire::CreateJobRequest;

fn master() -> Master<helios_coord::MemorySession> {
    let store = MemoryStore::new();
    Master::new(std::sync::Arc::new(store.session()), MasterConfig::default())
}

#[tokio::test]
async fn creates_a_new_job_and_derives_its_id() {
    let master = master();
    let config = JobConfig::new("foozbarz", "17", "testStartStop:4711").command(vec!["foo".to_string()]);
    let id = master.create_job(CreateJobRequest { config, hash: None }).await.unwrap();
    assert_eq!(id.name(), "foozbarz");
    assert!(id.is_fully_qualified());
}

#[tokio::test]
async fn is_idempotent_for_identical_config() {
    let master = master();
    let config = JobConfig::new("svc", "1", "img");
    let first = master.create_job(CreateJobRequest { config: config.clone(), hash: None }).await.unwrap();
    let second = master.create_job(CreateJobRequest { config, hash: None }).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn rejects_a_mismatched_submitted_hash() {
    let master = master();
    let config = JobConfig::new("svc", "1", "img");
    let err = master
        .create_job(CreateJobRequest { config, hash: Some("deadbeef".to_string()) })
        .await
        .unwrap_err();
    assert!(matches!(err, MasterError::InvalidJob(_)));
}

#[tokio::test]
async fn same_name_and_version_with_different_config_is_a_conflict() {
    let master = master();
    // Same JobId is impossible by construction for differing configs, but an
    // operator can still submit a precomputed hash for the *other* config's id.
    let a = JobConfig::new("svc", "1", "img-a");
    let id_a = master.create_job(CreateJobRequest { config: a, hash: None }).await.unwrap();

    let b = JobConfig::new("svc", "1", "img-b");
    let err = master
        .create_job(CreateJobRequest { config: b, hash: Some(id_a.hash().unwrap().to_string()) })
        .await
        .unwrap_err();
    assert!(matches!(err, MasterError::InvalidJob(_)));
}
