// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn goal_display_matches_wire_form() {
    assert_eq!(Goal::Start.to_string(), "START");
    assert_eq!(Goal::Stop.to_string(), "STOP");
    assert_eq!(Goal::Undeploy.to_string(), "UNDEPLOY");
}

#[test]
fn deployment_serializes_job_id_as_bare_string() {
    let id = JobId::parse("svc:1:deadbeef").unwrap();
    let deployment = Deployment::new(id, "host-a", Goal::Start);
    let json = serde_json::to_value(&deployment).unwrap();
    assert_eq!(json["job_id"], "svc:1:deadbeef");
    assert_eq!(json["host"], "host-a");
    assert_eq!(json["goal"], "start");
}

#[test]
fn deployment_round_trips() {
    let id = JobId::parse("svc:1:deadbeef").unwrap();
    let deployment = Deployment::new(id, "host-a", Goal::Stop);
    let json = serde_json::to_string(&deployment).unwrap();
    let back: Deployment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, deployment);
}
