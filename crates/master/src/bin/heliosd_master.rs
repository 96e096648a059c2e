// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `heliosd-master`: binds the RPC listener and serves it against a
//! coordination client built from `HELIOS_*` environment variables (§6).
//! No real ZooKeeper/etcd backend ships in this workspace (§10), so this
//! binary wires up the in-memory reference client; swapping in a real one
//! only requires a different `CoordinationClient` behind the same `Arc`.

use helios_coord::MemoryStore;
use helios_master::{run_server, Master, MasterConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = MasterConfig::from_env();
    tracing::info!(bind_addr = %config.bind_addr, "starting heliosd-master");

    // The coordination store is the single source of truth (§3); this
    // workspace's only backend keeps that store in this process's memory,
    // so the Master has no durable state of its own to recover on restart.
    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let master = Arc::new(Master::new(client, config.clone()));

    let listener = TcpListener::bind(config.bind_addr).await?;
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal");
            shutdown_signal.cancel();
        }
    });

    run_server(master, listener, shutdown).await;
    Ok(())
}
