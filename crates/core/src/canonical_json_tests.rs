// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn object_keys_are_sorted() {
    let value = serde_json::json!({"version": "1", "name": "a", "env": {}});
    let bytes = canonical_bytes(&value);
    let s = String::from_utf8(bytes).unwrap();
    assert_eq!(s, r#"{"env":{},"name":"a","version":"1"}"#);
}

#[test]
fn no_insignificant_whitespace() {
    let value = serde_json::json!({"a": [1, 2, 3]});
    let s = String::from_utf8(canonical_bytes(&value)).unwrap();
    assert!(!s.contains(' '));
}

#[test]
fn empty_containers_are_preserved() {
    let value = serde_json::json!({"command": [], "env": {}});
    let s = String::from_utf8(canonical_bytes(&value)).unwrap();
    assert_eq!(s, r#"{"command":[],"env":{}}"#);
}

#[test]
fn nested_maps_sort_recursively() {
    let value = serde_json::json!({"env": {"b": "2", "a": "1"}});
    let s = String::from_utf8(canonical_bytes(&value)).unwrap();
    assert_eq!(s, r#"{"env":{"a":"1","b":"2"}}"#);
}
