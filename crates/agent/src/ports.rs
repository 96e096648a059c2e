// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic port assignment (§4.4): "when a PortMapping has no external
//! port, the Agent selects one from its configured range, excluding ports
//! already assigned to other Task Runners on this host." Owned exclusively
//! by the Agent supervisor; Task Runners request allocations through it
//! (§5: "the local port-assignment map is mutated only by the Agent
//! supervisor").

use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortAllocationError {
    #[error("no free ports remain in the configured dynamic range")]
    RangeExhausted,
}

/// In-memory map of ports currently held by Task Runners on this host.
pub struct PortAllocator {
    range: RangeInclusive<u16>,
    assigned: HashSet<u16>,
}

impl PortAllocator {
    pub fn new(range: RangeInclusive<u16>) -> Self {
        Self { range, assigned: HashSet::new() }
    }

    /// Marks `port` as held without drawing it from the dynamic range —
    /// used for a Job's fixed `external_port` so the allocator never hands
    /// it out to a different Task Runner.
    pub fn reserve_fixed(&mut self, port: u16) {
        self.assigned.insert(port);
    }

    /// Assigns the lowest free port in the configured range.
    pub fn assign(&mut self) -> Result<u16, PortAllocationError> {
        for port in self.range.clone() {
            if self.assigned.insert(port) {
                return Ok(port);
            }
        }
        Err(PortAllocationError::RangeExhausted)
    }

    /// Releases a port held for a Task Runner that has been stopped or
    /// undeployed, whether it was fixed or dynamically assigned.
    pub fn release(&mut self, port: u16) {
        self.assigned.remove(&port);
    }

    pub fn is_assigned(&self, port: u16) -> bool {
        self.assigned.contains(&port)
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
