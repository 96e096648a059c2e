// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[tokio::test]
async fn succeeds_without_retry_when_first_attempt_succeeds() {
    let calls = AtomicU32::new(0);
    let result = with_retry(RetryPolicy::default(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, CoordError>(42) }
    })
    .await;
    assert_eq!(result, Ok(42));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retries_transient_errors_until_success() {
    let calls = AtomicU32::new(0);
    let result = with_retry(
        RetryPolicy { max_attempts: 5, base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(5) },
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(CoordError::Transient("flaky".to_string()))
                } else {
                    Ok(())
                }
            }
        },
    )
    .await;
    assert_eq!(result, Ok(()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let calls = AtomicU32::new(0);
    let result: Result<(), CoordError> = with_retry(
        RetryPolicy { max_attempts: 3, base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(2) },
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoordError::Transient("down".to_string())) }
        },
    )
    .await;
    assert_eq!(result, Err(CoordError::Transient("down".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn never_retries_non_transient_errors() {
    let calls = AtomicU32::new(0);
    let result: Result<(), CoordError> = with_retry(RetryPolicy::default(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(CoordError::NotFound("/x".to_string())) }
    })
    .await;
    assert_eq!(result, Err(CoordError::NotFound("/x".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
