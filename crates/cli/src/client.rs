// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin TCP client for the Master's RPC surface (§4.3, §6), speaking
//! `helios-wire`'s length-prefixed JSON frames. Exists only to smoke-test
//! the Master; the real operator-facing CLI is out of scope (§1).

use crate::exit_error::ExitError;
use helios_wire::{read_frame, write_frame, Request, Response, RpcError};
use tokio::net::TcpStream;

/// Sends one request and waits for its matching response on a fresh
/// connection — the Master treats each connection as carrying exactly one
/// request/response pair (`server.rs::handle_connection`).
pub async fn call(addr: &str, request: Request) -> Result<Response, ExitError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ExitError::new(2, format!("could not connect to master at {addr}: {e}")))?;

    write_frame(&mut stream, &request)
        .await
        .map_err(|e| ExitError::new(2, format!("failed to send request: {e}")))?;

    let outcome: Result<Response, RpcError> = read_frame(&mut stream)
        .await
        .map_err(|e| ExitError::new(2, format!("failed to read response: {e}")))?;

    outcome.map_err(|e| ExitError::new(1, format!("{:?}: {}", e.kind, e.message)))
}
