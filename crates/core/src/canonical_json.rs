// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical JSON serialization used for content-addressed hashing.
//!
//! `serde_json::Map` is a `BTreeMap` in this workspace (the `preserve_order`
//! feature is never enabled), so any `serde_json::Value::Object` built here
//! serializes with sorted keys automatically. Combined with `to_vec`'s
//! compact (whitespace-free) output, that's exactly the canonical form
//! JobId hashing requires: UTF-8, sorted keys, no insignificant whitespace,
//! standard escaping.

use serde_json::Value;

/// Serialize `value` to its canonical byte representation.
///
/// Panics only if `value` is not representable as JSON, which cannot happen
/// for the `serde_json::Value` trees this crate builds internally.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).expect("Value always serializes")
}

#[cfg(test)]
#[path = "canonical_json_tests.rs"]
mod tests;
