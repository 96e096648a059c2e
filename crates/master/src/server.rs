// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Master's RPC server loop: accepts TCP connections, reads one framed
//! [`Request`] per connection, dispatches it, and writes back one framed
//! `Result<Response, RpcError>`. Mirrors the teacher's `Listener::run`
//! accept-loop shape (`daemon/src/listener/mod.rs`), generalized from a
//! Unix+TCP dual listener down to TCP only since the Master has no local
//! trusted-socket fast path to preserve.

use crate::{Master, MasterError};
use helios_coord::CoordinationClient;
use helios_wire::{read_frame, write_frame, Request, Response, RpcError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

impl<C: CoordinationClient> Master<C> {
    /// Dispatches one already-decoded request. Split out from the
    /// connection loop so tests can exercise dispatch without a socket.
    pub async fn dispatch(&self, request: Request) -> Result<Response, MasterError> {
        match request {
            Request::CreateJob(req) => self.create_job(req).await.map(Response::JobId),
            Request::RemoveJob(req) => self.remove_job(req).await.map(|()| Response::Ok),
            Request::Deploy(req) => self.deploy(req).await.map(|()| Response::Ok),
            Request::SetGoal(req) => self.set_goal(req).await.map(|()| Response::Ok),
            Request::Undeploy(req) => self.undeploy(req).await.map(|()| Response::Ok),
            Request::GetJob(req) => self.get_job(req).await.map(Response::Job),
            Request::ListJobs(req) => self.list_jobs(req).await.map(Response::Jobs),
            Request::HostStatus(req) => self.host_status(req).await.map(Response::HostStatus),
            Request::JobHistory(req) => self.job_history(req).await.map(Response::History),
        }
    }
}

/// Runs the RPC accept loop until `shutdown` is cancelled. Each connection
/// is handled on its own spawned task so one slow client cannot stall
/// others (§5: "parallel... independent thread of execution").
pub async fn run_server<C: CoordinationClient>(
    master: Arc<Master<C>>,
    listener: TcpListener,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("master RPC server shutting down");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        tracing::debug!(%addr, "accepted master RPC connection");
                        let master = Arc::clone(&master);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, master).await {
                                tracing::warn!(error = %e, "master RPC connection error");
                            }
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "master RPC accept error"),
                }
            }
        }
    }
}

async fn handle_connection<C: CoordinationClient>(
    mut stream: tokio::net::TcpStream,
    master: Arc<Master<C>>,
) -> Result<(), helios_wire::FrameError> {
    let request: Request = read_frame(&mut stream).await?;
    let op = request.op_name();
    let outcome: Result<Response, RpcError> = master
        .dispatch(request)
        .await
        .map_err(|e: MasterError| RpcError::new(e.kind(), e.to_string()));
    match &outcome {
        Ok(_) => tracing::info!(op, "rpc ok"),
        Err(e) => tracing::warn!(op, kind = ?e.kind, message = %e.message, "rpc error"),
    }
    write_frame(&mut stream, &outcome).await
}
