// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proptest strategies shared across crates' test suites. Gated behind
//! `test-support` so downstream crates can depend on `helios-core` with
//! this feature enabled only in `[dev-dependencies]`.

use crate::job::{Job, JobConfig};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// A name/version component: non-empty, no colons, ASCII-ish.
fn name_like() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}".prop_map(|s| s.to_string())
}

prop_compose! {
    /// Arbitrary valid [`JobConfig`] (no ports — hashing excludes them, so
    /// most property tests don't need them).
    pub fn arb_job_config()(
        name in name_like(),
        version in name_like(),
        image in name_like(),
        command in prop::collection::vec(name_like(), 0..4),
        env in prop::collection::btree_map(name_like(), name_like(), 0..4),
    ) -> JobConfig {
        JobConfig::new(name, version, image).command(command).env(env)
    }
}

prop_compose! {
    /// Arbitrary valid, already-hashed [`Job`].
    pub fn arb_job()(config in arb_job_config()) -> Job {
        config.build(None).expect("arb_job_config always produces a valid config")
    }
}

/// A deterministic fixture map for tests that want a stable, non-random env.
pub fn sample_env() -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("FOO".to_string(), "BAR".to_string());
    env
}
