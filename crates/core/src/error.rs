// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor validation and parsing errors.

use thiserror::Error;

/// Errors raised while validating a [`crate::job::JobConfig`] before it is
/// hashed into a [`crate::job_id::JobId`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("job name must not be empty")]
    EmptyName,
    #[error("job version must not be empty")]
    EmptyVersion,
    #[error("job name must not contain ':': {0:?}")]
    NameContainsColon(String),
    #[error("job version must not contain ':': {0:?}")]
    VersionContainsColon(String),
    #[error("port mapping {0:?} has internal_port 0")]
    InvalidInternalPort(String),
    #[error("submitted hash {submitted} does not match computed hash {computed} for {name}:{version}")]
    HashMismatch { name: String, version: String, submitted: String, computed: String },
}

/// Errors raised while parsing a [`crate::job_id::JobId`] from its string form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("job id {0:?} must have 1, 2, or 3 colon-separated parts, got {1}")]
    WrongPartCount(String, usize),
    #[error("job id {0:?} has an empty name")]
    EmptyName(String),
}
