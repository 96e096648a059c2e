// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port mappings published inside a [`crate::job::Job`] config and
//! resolved by the Agent's dynamic port allocator.

use serde::{Deserialize, Serialize};

/// Transport protocol for a published port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

crate::simple_display! {
    Protocol {
        Tcp => "tcp",
        Udp => "udp",
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Tcp
    }
}

/// A single named port a Job's container exposes.
///
/// `external_port` is fixed when present; otherwise the Agent assigns one
/// from its configured dynamic range at deploy time and holds it for the
/// life of the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortMapping {
    pub internal_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_port: Option<u16>,
    #[serde(default)]
    pub protocol: Protocol,
}

impl PortMapping {
    pub fn new(internal_port: u16) -> Self {
        Self { internal_port, external_port: None, protocol: Protocol::default() }
    }

    pub fn with_external_port(mut self, port: u16) -> Self {
        self.external_port = Some(port);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// True when the Agent must assign a port dynamically (no fixed external
    /// port configured).
    pub fn needs_dynamic_assignment(&self) -> bool {
        self.external_port.is_none()
    }
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
