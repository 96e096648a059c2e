// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_job_id_accepts_name_version_hash() {
    let id = parse_job_id("web:1:abc123").unwrap();
    assert_eq!(id.name(), "web");
}

#[test]
fn parse_job_id_rejects_garbage() {
    assert!(parse_job_id("a:b:c:d").is_err());
}

#[test]
fn parse_goal_accepts_the_three_known_goals() {
    assert_eq!(parse_goal("start").unwrap(), Goal::Start);
    assert_eq!(parse_goal("stop").unwrap(), Goal::Stop);
    assert_eq!(parse_goal("undeploy").unwrap(), Goal::Undeploy);
}

#[test]
fn parse_goal_rejects_unknown_values() {
    assert!(parse_goal("pause").is_err());
}

#[test]
fn parse_env_splits_on_first_equals() {
    let env = parse_env(&["KEY=VAL=UE".to_string()]).unwrap();
    assert_eq!(env.get("KEY").map(String::as_str), Some("VAL=UE"));
}

#[test]
fn parse_env_rejects_a_pair_without_equals() {
    assert!(parse_env(&["NOEQUALS".to_string()]).is_err());
}
