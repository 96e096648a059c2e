// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process reference implementation of [`CoordinationClient`] (§10: a
//! real ZooKeeper/etcd-backed client is explicitly out of scope). Good
//! enough to drive the Master and Agent end to end in tests and in the
//! demo binaries — not durable, not networked, not shared across processes.

use crate::client::{CoordinationClient, CreateMode, EphemeralRegistration, Op, WatchEvent, WatchKind, WatchStream};
use crate::error::CoordError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Identifies one logical session against a [`MemoryStore`]. Every
/// [`MemorySession`] handle owns one; killing it (via
/// [`MemoryStore::kill_session`]) drops that session's ephemeral nodes and
/// tells anyone watching about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

#[derive(Debug, Clone)]
struct Node {
    data: Vec<u8>,
    version: i64,
    ephemeral_owner: Option<SessionId>,
}

struct Watcher {
    session: SessionId,
    tx: mpsc::Sender<WatchEvent>,
}

#[derive(Default)]
struct SessionState {
    ephemeral_paths: Vec<String>,
    lost_signals: Vec<oneshot::Sender<()>>,
}

#[derive(Default)]
struct Tree {
    nodes: HashMap<String, Node>,
    data_watchers: HashMap<String, Vec<Watcher>>,
    children_watchers: HashMap<String, Vec<Watcher>>,
    existence_watchers: HashMap<String, Vec<Watcher>>,
    sessions: HashMap<SessionId, SessionState>,
}

impl Tree {
    fn parent_of(path: &str) -> Option<String> {
        let trimmed = path.trim_end_matches('/');
        let idx = trimmed.rfind('/')?;
        if idx == 0 {
            Some("/".to_string())
        } else {
            Some(trimmed[..idx].to_string())
        }
    }

    fn notify(watchers: &mut HashMap<String, Vec<Watcher>>, path: &str, kill_session: Option<SessionId>) {
        if let Some(list) = watchers.remove(path) {
            for w in list {
                let event = if Some(w.session) == kill_session { WatchEvent::SessionLost } else { WatchEvent::Fired };
                let _ = w.tx.try_send(event);
            }
        }
    }

    fn fire_data(&mut self, path: &str) {
        Self::notify(&mut self.data_watchers, path, None);
    }

    fn fire_children(&mut self, path: &str) {
        Self::notify(&mut self.children_watchers, path, None);
    }

    fn fire_existence(&mut self, path: &str) {
        Self::notify(&mut self.existence_watchers, path, None);
    }
}

/// The shared backing store. Cheap to clone; clones refer to the same tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tree>>,
    next_session: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new logical session. Each session's ephemeral nodes and
    /// registered watches are independent of every other session's.
    pub fn session(&self) -> MemorySession {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst));
        self.inner.lock().sessions.insert(id, SessionState::default());
        MemorySession { store: self.clone(), session: id }
    }

    /// Simulates loss of a session: its ephemeral nodes vanish, watchers on
    /// the affected paths are notified (`SessionLost` to the session's own
    /// watches, `Fired` to everyone else's so they re-read and observe the
    /// deletion), and any outstanding [`EphemeralRegistration`] handles for
    /// that session resolve their `lost()` future.
    pub fn kill_session(&self, session: SessionId) {
        let mut tree = self.inner.lock();
        let Some(state) = tree.sessions.remove(&session) else { return };
        for path in &state.ephemeral_paths {
            tree.nodes.remove(path);
            let parent = Tree::parent_of(path);
            Tree::notify(&mut tree.data_watchers, path, Some(session));
            Tree::notify(&mut tree.existence_watchers, path, Some(session));
            if let Some(parent) = parent {
                Tree::notify(&mut tree.children_watchers, &parent, Some(session));
            }
        }
        for signal in state.lost_signals {
            let _ = signal.send(());
        }
    }
}

/// A [`CoordinationClient`] bound to one [`MemoryStore`] session.
#[derive(Clone)]
pub struct MemorySession {
    store: MemoryStore,
    session: SessionId,
}

impl MemorySession {
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    fn create_locked(tree: &mut Tree, session: SessionId, path: &str, data: Vec<u8>, mode: CreateMode) -> Result<(), CoordError> {
        if tree.nodes.contains_key(path) {
            return Err(CoordError::Exists(path.to_string()));
        }
        if let Some(parent) = Tree::parent_of(path) {
            if parent != "/" && !tree.nodes.contains_key(&parent) {
                return Err(CoordError::NotFound(parent));
            }
        }
        let ephemeral_owner = match mode {
            CreateMode::Ephemeral => Some(session),
            CreateMode::Persistent => None,
        };
        tree.nodes.insert(path.to_string(), Node { data, version: 0, ephemeral_owner });
        if mode == CreateMode::Ephemeral {
            if let Some(state) = tree.sessions.get_mut(&session) {
                state.ephemeral_paths.push(path.to_string());
            }
        }
        tree.fire_data(path);
        tree.fire_existence(path);
        if let Some(parent) = Tree::parent_of(path) {
            tree.fire_children(&parent);
        }
        Ok(())
    }

    fn set_locked(tree: &mut Tree, path: &str, data: Vec<u8>) -> Result<i64, CoordError> {
        let node = tree.nodes.get_mut(path).ok_or_else(|| CoordError::NotFound(path.to_string()))?;
        node.data = data;
        node.version += 1;
        let version = node.version;
        tree.fire_data(path);
        Ok(version)
    }

    fn delete_locked(tree: &mut Tree, path: &str, expected_version: Option<i64>) -> Result<(), CoordError> {
        let node = tree.nodes.get(path).ok_or_else(|| CoordError::NotFound(path.to_string()))?;
        if let Some(expected) = expected_version {
            if node.version != expected {
                return Err(CoordError::BadVersion(path.to_string(), expected, node.version));
            }
        }
        tree.nodes.remove(path);
        tree.fire_data(path);
        tree.fire_existence(path);
        if let Some(parent) = Tree::parent_of(path) {
            tree.fire_children(&parent);
        }
        Ok(())
    }
}

#[async_trait]
impl CoordinationClient for MemorySession {
    async fn create(&self, path: &str, data: Vec<u8>, mode: CreateMode) -> Result<(), CoordError> {
        let mut tree = self.store.inner.lock();
        Self::create_locked(&mut tree, self.session, path, data, mode)
    }

    async fn set(&self, path: &str, data: Vec<u8>) -> Result<i64, CoordError> {
        let mut tree = self.store.inner.lock();
        Self::set_locked(&mut tree, path, data)
    }

    async fn delete(&self, path: &str, expected_version: Option<i64>) -> Result<(), CoordError> {
        let mut tree = self.store.inner.lock();
        Self::delete_locked(&mut tree, path, expected_version)
    }

    async fn get(&self, path: &str) -> Result<(Vec<u8>, i64), CoordError> {
        let tree = self.store.inner.lock();
        let node = tree.nodes.get(path).ok_or_else(|| CoordError::NotFound(path.to_string()))?;
        Ok((node.data.clone(), node.version))
    }

    async fn children(&self, path: &str) -> Result<Vec<String>, CoordError> {
        let tree = self.store.inner.lock();
        if path != "/" && !tree.nodes.contains_key(path) {
            return Err(CoordError::NotFound(path.to_string()));
        }
        let prefix = if path == "/" { "/".to_string() } else { format!("{path}/") };
        let names = tree
            .nodes
            .keys()
            .filter_map(|p| {
                let rest = p.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    None
                } else {
                    Some(rest.to_string())
                }
            })
            .collect();
        Ok(names)
    }

    async fn transaction(&self, ops: Vec<Op>) -> Result<(), CoordError> {
        let mut tree = self.store.inner.lock();
        for op in &ops {
            match op {
                Op::Create { path, mode, .. } => {
                    if tree.nodes.contains_key(path) {
                        return Err(CoordError::Exists(path.clone()));
                    }
                    if let Some(parent) = Tree::parent_of(path) {
                        if parent != "/" && !tree.nodes.contains_key(&parent) {
                            return Err(CoordError::NotFound(parent));
                        }
                    }
                    let _ = mode;
                }
                Op::Set { path, .. } | Op::Delete { path, .. } | Op::CheckExists { path } => {
                    if !tree.nodes.contains_key(path) {
                        return Err(CoordError::NotFound(path.clone()));
                    }
                }
                Op::CheckAbsent { path } => {
                    if tree.nodes.contains_key(path) {
                        return Err(CoordError::Exists(path.clone()));
                    }
                }
            }
        }
        for op in ops {
            match op {
                Op::Create { path, data, mode } => {
                    Self::create_locked(&mut tree, self.session, &path, data, mode)?;
                }
                Op::Set { path, data } => {
                    Self::set_locked(&mut tree, &path, data)?;
                }
                Op::Delete { path, version } => {
                    Self::delete_locked(&mut tree, &path, version)?;
                }
                Op::CheckExists { .. } | Op::CheckAbsent { .. } => {}
            }
        }
        Ok(())
    }

    async fn watch(&self, path: &str, kind: WatchKind) -> Result<WatchStream, CoordError> {
        let (tx, rx) = mpsc::channel(1);
        let mut tree = self.store.inner.lock();
        let watcher = Watcher { session: self.session, tx };
        let target = match kind {
            WatchKind::Data => &mut tree.data_watchers,
            WatchKind::Children => &mut tree.children_watchers,
            WatchKind::Existence => &mut tree.existence_watchers,
        };
        target.entry(path.to_string()).or_default().push(watcher);
        Ok(rx)
    }

    async fn register_ephemeral(&self, path: &str, data: Vec<u8>) -> Result<EphemeralRegistration, CoordError> {
        self.create(path, data, CreateMode::Ephemeral).await?;
        let (tx, rx) = oneshot::channel();
        let mut tree = self.store.inner.lock();
        if let Some(state) = tree.sessions.get_mut(&self.session) {
            state.lost_signals.push(tx);
        }
        Ok(EphemeralRegistration::new(path.to_string(), rx))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
