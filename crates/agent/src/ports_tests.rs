// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn assigns_ports_in_ascending_order() {
    let mut alloc = PortAllocator::new(20000..=20002);
    assert_eq!(alloc.assign(), Ok(20000));
    assert_eq!(alloc.assign(), Ok(20001));
    assert_eq!(alloc.assign(), Ok(20002));
    assert_eq!(alloc.assign(), Err(PortAllocationError::RangeExhausted));
}

#[test]
fn reserved_fixed_ports_are_excluded_from_dynamic_assignment() {
    let mut alloc = PortAllocator::new(20000..=20002);
    alloc.reserve_fixed(20001);
    assert_eq!(alloc.assign(), Ok(20000));
    assert_eq!(alloc.assign(), Ok(20002));
    assert_eq!(alloc.assign(), Err(PortAllocationError::RangeExhausted));
}

#[test]
fn release_frees_a_port_for_reuse() {
    let mut alloc = PortAllocator::new(20000..=20000);
    let port = alloc.assign().unwrap();
    assert_eq!(alloc.assign(), Err(PortAllocationError::RangeExhausted));
    alloc.release(port);
    assert_eq!(alloc.assign(), Ok(port));
}

#[test]
fn is_assigned_reflects_current_holds() {
    let mut alloc = PortAllocator::new(20000..=20000);
    assert!(!alloc.is_assigned(20000));
    alloc.assign().unwrap();
    assert!(alloc.is_assigned(20000));
}
