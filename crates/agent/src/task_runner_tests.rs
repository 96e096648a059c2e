// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::AgentConfig;
use crate::ports::PortAllocator;
use crate::runtime::fake::FakeContainerRuntime;
use helios_core::{FakeClock, Job, JobConfig};
use helios_coord::MemoryStore;

const HOST: &str = "host-a";

fn config() -> AgentConfig {
    AgentConfig::default()
}

async fn seed_job(client: &helios_coord::MemorySession, job: &Job) {
    client.ensure_path("/jobs").await.unwrap();
    client
        .create(&paths::job(&job.id), serde_json::to_vec(job).unwrap(), CreateMode::Persistent)
        .await
        .unwrap();
}

fn runner(
    job_id: JobId,
    client: Arc<helios_coord::MemorySession>,
    runtime: Arc<FakeContainerRuntime>,
    clock: FakeClock,
) -> TaskRunner<helios_coord::MemorySession, FakeContainerRuntime, FakeClock> {
    let ports = Arc::new(Mutex::new(PortAllocator::new(30000..=30010)));
    TaskRunner::new(job_id, HOST.to_string(), client, runtime, ports, clock, &config())
}

#[tokio::test]
async fn new_runner_starts_in_creating_with_start_goal() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let runtime = Arc::new(FakeContainerRuntime::new());
    let job = Job::builder().name("web").build();
    let r = runner(job.id.clone(), client, runtime, FakeClock::new());
    assert_eq!(r.state(), TaskState::Creating);
}

#[tokio::test]
async fn happy_path_reaches_running_without_a_pull() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client, runtime, FakeClock::new());

    assert!(r.step().await.unwrap()); // (start) -> CREATING, published with null containerId
    assert_eq!(r.state(), TaskState::Creating);

    assert!(r.step().await.unwrap()); // CREATING -> STARTING (image already local, no pull)
    assert_eq!(r.state(), TaskState::Starting);
    assert!(r.container_id().is_some());

    assert!(r.step().await.unwrap()); // STARTING -> RUNNING
    assert_eq!(r.state(), TaskState::Running);

    assert!(!r.step().await.unwrap()); // RUNNING, nothing changed
    assert_eq!(r.state(), TaskState::Running);
}

#[tokio::test]
async fn pull_is_retried_transiently_before_succeeding() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("myapp:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new());
    runtime.fail_pull_transiently("myapp:1", 2);
    let clock = FakeClock::new();
    let mut r = runner(job.id.clone(), client, runtime, clock.clone());

    assert!(r.step().await.unwrap()); // (start) -> CREATING
    assert!(r.step().await.unwrap()); // CREATING -> PULLING_IMAGE
    assert_eq!(r.state(), TaskState::PullingImage);

    // Two transient failures; each sets a ready_at in the future so an
    // immediate re-step is a no-op until the clock advances.
    for _ in 0..2 {
        assert!(r.step().await.unwrap());
        assert_eq!(r.state(), TaskState::PullingImage);
        assert!(!r.step().await.unwrap(), "still throttled before the clock advances");
        clock.advance(Duration::from_secs(5));
    }

    assert!(r.step().await.unwrap()); // third attempt succeeds -> STARTING
    assert_eq!(r.state(), TaskState::Starting);
}

#[tokio::test]
async fn permanently_missing_image_fails_the_task() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("ghost:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new());
    runtime.mark_image_missing("ghost:1");
    let mut r = runner(job.id.clone(), client, runtime, FakeClock::new());

    assert!(r.step().await.unwrap()); // (start) -> CREATING
    assert!(r.step().await.unwrap());
    assert_eq!(r.state(), TaskState::PullingImage);
    assert!(r.step().await.unwrap());
    assert_eq!(r.state(), TaskState::Failed);
}

#[tokio::test]
async fn exit_is_observed_and_restarted_when_goal_is_start() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let clock = FakeClock::new();
    let mut r = runner(job.id.clone(), client, runtime.clone(), clock.clone());

    r.step().await.unwrap(); // -> CREATING (published)
    r.step().await.unwrap(); // CREATING -> STARTING (image already local, no pull)
    r.step().await.unwrap(); // -> RUNNING
    let id = r.container_id().unwrap().clone();
    runtime.simulate_exit(&id, 0);

    assert!(r.step().await.unwrap()); // RUNNING -> EXITED
    assert_eq!(r.state(), TaskState::Exited);

    assert!(!r.step().await.unwrap(), "throttled by restart backoff");
    clock.advance(Duration::from_secs(5));
    assert!(r.step().await.unwrap()); // backoff elapsed -> back to CREATING
    assert_eq!(r.state(), TaskState::Creating);
}

#[tokio::test]
async fn stop_goal_overrides_the_current_state_and_tears_down() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client, runtime, FakeClock::new());

    r.step().await.unwrap();
    r.step().await.unwrap();
    r.step().await.unwrap();
    assert_eq!(r.state(), TaskState::Running);

    r.set_goal(Goal::Stop);
    assert!(r.step().await.unwrap()); // RUNNING -> STOPPING
    assert_eq!(r.state(), TaskState::Stopping);
    assert!(r.step().await.unwrap()); // container gone -> STOPPED
    assert_eq!(r.state(), TaskState::Stopped);
}

#[tokio::test]
async fn undeploy_removes_the_published_status_after_stopping() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client.clone(), runtime, FakeClock::new());

    r.step().await.unwrap();
    r.step().await.unwrap();
    r.step().await.unwrap();

    r.set_goal(Goal::Undeploy);
    r.step().await.unwrap(); // -> STOPPING
    r.step().await.unwrap(); // -> STOPPED, garbage collected

    let status_path = paths::status_host_job(HOST, &job.id);
    assert!(matches!(client.get(&status_path).await, Err(CoordError::NotFound(_))));
}

#[tokio::test]
async fn published_status_carries_the_jobs_env() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let mut env = BTreeMap::new();
    env.insert("LOG_LEVEL".to_string(), "debug".to_string());
    let job = Job::builder().name("web").image("nginx:1").env(env.clone()).build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client.clone(), runtime, FakeClock::new());

    assert!(r.step().await.unwrap()); // (start) -> CREATING
    let status_path = paths::status_host_job(HOST, &job.id);
    let (bytes, _) = client.get(&status_path).await.unwrap();
    let published: TaskStatus = serde_json::from_slice(&bytes).unwrap();
    assert!(published.env.is_empty(), "env unknown before the job is read");

    assert!(r.step().await.unwrap()); // CREATING -> STARTING, job read, env cached
    let (bytes, _) = client.get(&status_path).await.unwrap();
    let published: TaskStatus = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(published.env, env);
}

#[tokio::test]
async fn dynamic_ports_are_resolved_on_first_entry_to_creating() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let mut ports = BTreeMap::new();
    ports.insert("http".to_string(), PortMapping::new(8080));
    let job = JobConfig::new("web", "1", "nginx:1").ports(ports).build(None).unwrap();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client, runtime, FakeClock::new());

    r.step().await.unwrap(); // (start) -> CREATING (published)
    r.step().await.unwrap(); // CREATING resolves the port, -> STARTING (image already local)
    let assigned = r.assigned_ports.get("http").unwrap();
    assert_eq!(assigned.internal_port, 8080);
    assert!(assigned.external_port.is_some());
    assert!((30000..=30010).contains(&assigned.external_port.unwrap()));
}

#[tokio::test]
async fn bootstrap_resumes_from_a_previously_published_status() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));

    let mut first = runner(job.id.clone(), client.clone(), runtime.clone(), FakeClock::new());
    first.step().await.unwrap();
    first.step().await.unwrap();
    first.step().await.unwrap();
    assert_eq!(first.state(), TaskState::Running);

    let mut resumed = runner(job.id.clone(), client, runtime, FakeClock::new());
    resumed.bootstrap().await.unwrap();
    assert_eq!(resumed.state(), TaskState::Running);
    assert_eq!(resumed.container_id(), first.container_id());
}

#[tokio::test]
async fn bootstrap_adopts_a_running_container_when_no_status_was_published() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let orphan = runtime
        .create_container(ContainerSpec {
            job_id_label: job.id.to_string(),
            image: "nginx:1".to_string(),
            command: Vec::new(),
            env: BTreeMap::new(),
            ports: BTreeMap::new(),
        })
        .await
        .unwrap();
    runtime.start_container(&orphan).await.unwrap();

    let mut r = runner(job.id.clone(), client, runtime, FakeClock::new());
    r.bootstrap().await.unwrap();
    assert_eq!(r.state(), TaskState::Running);
    assert_eq!(r.container_id(), Some(&orphan));
}

#[tokio::test]
async fn history_trail_is_pruned_to_the_retention_bound() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new());
    runtime.fail_pull_transiently("nginx:1", 50);
    let clock = FakeClock::new();
    let mut cfg = config();
    cfg.history_retention = 3;
    let ports = Arc::new(Mutex::new(PortAllocator::new(30000..=30010)));
    let mut r =
        TaskRunner::new(job.id.clone(), HOST.to_string(), client.clone(), runtime, ports, clock.clone(), &cfg);

    r.step().await.unwrap(); // -> PULLING_IMAGE
    for _ in 0..10 {
        r.step().await.unwrap();
        clock.advance(Duration::from_secs(1));
    }

    let root = paths::history_events_root(&job.id, HOST);
    let names = client.children(&root).await.unwrap();
    assert_eq!(names.len(), 3);
}

/// S4 — deploy then undeploy a `/bin/true`-style job: the history trail is
/// exactly `[CREATING, STARTING, RUNNING, EXITED]`, CREATING has a null
/// containerId, STARTING has a non-null one (no pull needed, so there are
/// no leading PULLING_IMAGE events to skip here).
#[tokio::test]
async fn s4_job_history_trail() {
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let job = Job::builder().name("web").image("nginx:1").command(vec!["/bin/true".to_string()]).build();
    seed_job(&client, &job).await;
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("nginx:1"));
    let mut r = runner(job.id.clone(), client.clone(), runtime.clone(), FakeClock::new());

    r.step().await.unwrap(); // -> CREATING (published)
    r.step().await.unwrap(); // CREATING -> STARTING (image already local, no pull)
    r.step().await.unwrap(); // -> RUNNING
    let id = r.container_id().unwrap().clone();
    runtime.simulate_exit(&id, 0);
    r.step().await.unwrap(); // RUNNING -> EXITED

    let root = paths::history_events_root(&job.id, HOST);
    let mut seqs = client.children(&root).await.unwrap();
    seqs.sort();
    let mut events = Vec::new();
    for seq in seqs {
        let (bytes, _) = client.get(&format!("{root}/{seq}")).await.unwrap();
        events.push(serde_json::from_slice::<helios_core::TaskStatusEvent>(&bytes).unwrap());
    }

    let states: Vec<TaskState> = events.iter().map(|e| e.status.state).collect();
    assert_eq!(states, vec![TaskState::Creating, TaskState::Starting, TaskState::Running, TaskState::Exited]);

    let creating = events.iter().find(|e| e.status.state == TaskState::Creating).unwrap();
    assert!(creating.status.container_id.is_none());
    let starting = events.iter().find(|e| e.status.state == TaskState::Starting).unwrap();
    assert!(starting.status.container_id.is_some());
}
