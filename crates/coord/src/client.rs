// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow, typed coordination contract the Master and Agent program
//! against (§4.2). Nothing above this trait knows or cares whether the
//! backing store is an in-process [`crate::memory::MemoryStore`] or, in a
//! real deployment, a ZooKeeper/etcd-backed client — none ship here (§10).

use crate::error::CoordError;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Whether a created node disappears with its owning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    Persistent,
    Ephemeral,
}

/// What a [`CoordinationClient::watch`] call reports on (§4.2: `kind ∈
/// {data, children, existence}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// The node's data, or its deletion.
    Data,
    /// The set of the node's direct children.
    Children,
    /// Whether the node exists at all — fires on either a create or a
    /// delete, independent of any data change. Lets a caller watch a path
    /// that doesn't exist yet without first having to `get` it and handle
    /// `NotFound`.
    Existence,
}

/// Edge-triggered notification delivered on a [`WatchStream`] (§4.2).
///
/// `Fired` carries no payload by design: the watch contract is "something
/// changed, go re-read" — not "here is the new value" — so a single missed
/// tick can never desync a consumer from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Fired,
    SessionLost,
}

pub type WatchStream = mpsc::Receiver<WatchEvent>;

/// One step of a [`CoordinationClient::transaction`]. All steps commit or
/// none do.
#[derive(Debug, Clone)]
pub enum Op {
    Create { path: String, data: Vec<u8>, mode: CreateMode },
    Set { path: String, data: Vec<u8> },
    Delete { path: String, version: Option<i64> },
    CheckExists { path: String },
    CheckAbsent { path: String },
}

impl Op {
    pub fn create(path: impl Into<String>, data: Vec<u8>, mode: CreateMode) -> Self {
        Op::Create { path: path.into(), data, mode }
    }

    pub fn set(path: impl Into<String>, data: Vec<u8>) -> Self {
        Op::Set { path: path.into(), data }
    }

    pub fn delete(path: impl Into<String>, version: Option<i64>) -> Self {
        Op::Delete { path: path.into(), version }
    }

    pub fn check_exists(path: impl Into<String>) -> Self {
        Op::CheckExists { path: path.into() }
    }

    pub fn check_absent(path: impl Into<String>) -> Self {
        Op::CheckAbsent { path: path.into() }
    }
}

/// A registered ephemeral node. Dropping this handle does not delete the
/// node — only session loss does (§4.2) — but it is how the owner learns
/// that the session carrying it has been lost, so it can stop acting as
/// though it still holds the node.
pub struct EphemeralRegistration {
    pub path: String,
    lost: oneshot::Receiver<()>,
}

impl EphemeralRegistration {
    pub fn new(path: String, lost: oneshot::Receiver<()>) -> Self {
        Self { path, lost }
    }

    /// Resolves once the session owning this node is lost.
    pub async fn lost(&mut self) {
        let _ = (&mut self.lost).await;
    }
}

/// The coordination store contract: create/set/delete/get/children,
/// multi-step transactions, edge-triggered watches, and ephemeral
/// registration tied to session lifetime (§4.2).
#[async_trait]
pub trait CoordinationClient: Send + Sync + 'static {
    async fn create(&self, path: &str, data: Vec<u8>, mode: CreateMode) -> Result<(), CoordError>;

    /// Overwrites the node's data unconditionally, returning the new version.
    async fn set(&self, path: &str, data: Vec<u8>) -> Result<i64, CoordError>;

    async fn delete(&self, path: &str, expected_version: Option<i64>) -> Result<(), CoordError>;

    /// Returns the node's data and current version.
    async fn get(&self, path: &str) -> Result<(Vec<u8>, i64), CoordError>;

    /// Returns the direct child names of `path`, unsorted.
    async fn children(&self, path: &str) -> Result<Vec<String>, CoordError>;

    async fn transaction(&self, ops: Vec<Op>) -> Result<(), CoordError>;

    /// Registers a one-shot, edge-triggered watch. Re-arm by calling again
    /// after each delivered event.
    async fn watch(&self, path: &str, kind: WatchKind) -> Result<WatchStream, CoordError>;

    async fn register_ephemeral(
        &self,
        path: &str,
        data: Vec<u8>,
    ) -> Result<EphemeralRegistration, CoordError>;

    /// Creates `path` and any missing ancestor persistent nodes, ignoring
    /// `Exists` at every level. A convenience built from the primitives
    /// above — real coordination services require callers to build out
    /// their own directory skeletons the same way.
    async fn ensure_path(&self, path: &str) -> Result<(), CoordError> {
        let mut built = String::new();
        for segment in path.trim_start_matches('/').split('/') {
            if segment.is_empty() {
                continue;
            }
            built.push('/');
            built.push_str(segment);
            match self.create(&built, Vec::new(), CreateMode::Persistent).await {
                Ok(()) | Err(CoordError::Exists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
