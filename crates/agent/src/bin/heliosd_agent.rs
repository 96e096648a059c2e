// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `heliosd-agent`: runs one [`Supervisor`] for this host, built from
//! `HELIOS_*` environment variables (§6). The real Docker/containerd/K8s
//! runtime is out of scope (§1) and never ships here, so this binary
//! wires the in-process [`FakeContainerRuntime`] behind the same
//! `ContainerRuntime` trait a production backend would implement.

use helios_agent::runtime::fake::FakeContainerRuntime;
use helios_agent::{AgentConfig, Supervisor};
use helios_core::SystemClock;
use helios_coord::MemoryStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AgentConfig::from_env();
    tracing::info!(host = %config.host, "starting heliosd-agent");

    let store = MemoryStore::new();
    let client = Arc::new(store.session());
    let runtime = Arc::new(FakeContainerRuntime::new());
    let supervisor = Arc::new(Supervisor::new(client, runtime, SystemClock, config));

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal");
            shutdown_signal.cancel();
        }
    });

    supervisor.run(shutdown).await;
    Ok(())
}
