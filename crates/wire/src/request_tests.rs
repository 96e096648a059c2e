use super::*;
use helios_core::JobConfig;

#[test]
fn create_job_request_round_trips_through_json() {
    let req = Request::CreateJob(CreateJobRequest {
        config: JobConfig::new("foozbarz", "17", "testStartStop:4711"),
        hash: None,
    });
    let bytes = serde_json::to_vec(&req).expect("serializes");
    let back: Request = serde_json::from_slice(&bytes).expect("deserializes");
    assert_eq!(req, back);
}

#[test]
fn deploy_request_defaults_goal_to_start_when_absent() {
    let json = serde_json::json!({
        "op": "Deploy",
        "body": { "job_id": "foo:1:abc", "host": "h1" }
    });
    let req: Request = serde_json::from_value(json).expect("deserializes");
    match req {
        Request::Deploy(d) => assert_eq!(d.goal, helios_core::Goal::Start),
        other => panic!("expected Deploy, got {other:?}"),
    }
}

#[test]
fn op_name_matches_every_variant() {
    let reqs = [
        Request::RemoveJob(RemoveJobRequest { job_id: helios_core::JobId::parse("a:1").unwrap() }),
        Request::ListJobs(ListJobsRequest::default()),
    ];
    assert_eq!(reqs[0].op_name(), "RemoveJob");
    assert_eq!(reqs[1].op_name(), "ListJobs");
}
