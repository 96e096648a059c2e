// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable Job descriptors and the canonical-hash [`JobId`] derivation.

use crate::canonical_json::canonical_bytes;
use crate::error::DescriptorError;
use crate::job_id::JobId;
use crate::port::PortMapping;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// The operator-submitted, pre-hash shape of a Job. `JobConfig::build`
/// validates it and derives the [`JobId`] to produce a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub version: String,
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub ports: BTreeMap<String, PortMapping>,
}

impl JobConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            image: image.into(),
            command: Vec::new(),
            env: BTreeMap::new(),
            ports: BTreeMap::new(),
        }
    }

    crate::setters! {
        set {
            command: Vec<String>,
            env: BTreeMap<String, String>,
            ports: BTreeMap<String, PortMapping>,
        }
    }

    /// Validate operator-controlled fields (§3, §4.1). Does not touch
    /// `hash` — that is derived, never submitted.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if self.name.contains(':') {
            return Err(DescriptorError::NameContainsColon(self.name.clone()));
        }
        if self.version.is_empty() {
            return Err(DescriptorError::EmptyVersion);
        }
        if self.version.contains(':') {
            return Err(DescriptorError::VersionContainsColon(self.version.clone()));
        }
        for (label, mapping) in &self.ports {
            if mapping.internal_port == 0 {
                return Err(DescriptorError::InvalidInternalPort(label.clone()));
            }
        }
        Ok(())
    }

    /// Canonical mapping hashed into the JobId, per spec §4.1 step 1-2:
    /// `{command, image, name, version, env}` with empty containers
    /// preserved. `ports` is deliberately excluded — see
    /// `DESIGN.md`'s "Canonical hash field set" entry.
    fn canonical_value(&self) -> serde_json::Value {
        serde_json::json!({
            "command": self.command,
            "env": self.env,
            "image": self.image,
            "name": self.name,
            "version": self.version,
        })
    }

    /// `configHash = SHA1(canonical(fields))`.
    fn config_hash(&self) -> [u8; 20] {
        let bytes = canonical_bytes(&self.canonical_value());
        let mut hasher = Sha1::new();
        hasher.update(&bytes);
        hasher.finalize().into()
    }

    /// `jobHash = hex(SHA1(name + ":" + version + ":" + hex(configHash)))`.
    fn job_hash(&self) -> String {
        let config_hash = self.config_hash();
        let input = format!("{}:{}:{}", self.name, self.version, hex::encode(config_hash));
        let mut hasher = Sha1::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Validate and derive a fully-qualified [`Job`] from this config.
    ///
    /// If `submitted_hash` is `Some`, it is compared against the computed
    /// hash and rejected on mismatch (§4.3: "the Master re-derives and
    /// rejects mismatch"). Callers building a brand-new Job should pass
    /// `None`.
    pub fn build(self, submitted_hash: Option<&str>) -> Result<Job, DescriptorError> {
        self.validate()?;
        let computed = self.job_hash();
        if let Some(submitted) = submitted_hash {
            if submitted != computed {
                return Err(DescriptorError::HashMismatch {
                    name: self.name.clone(),
                    version: self.version.clone(),
                    submitted: submitted.to_string(),
                    computed,
                });
            }
        }
        let id = JobId::new(self.name.clone(), self.version.clone(), Some(computed));
        Ok(Job { id, config: self })
    }
}

/// An immutable, content-addressed container specification. Once built,
/// a Job is never mutated — operators create a new Job (new JobId) to
/// change anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(flatten)]
    pub config: JobConfig,
}

impl Job {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn image(&self) -> &str {
        &self.config.image
    }

    /// Recompute the hash from `config` and check it against `id.hash()`.
    /// Exercises invariant (c) from spec §3/§8: `JobId.hash` in a stored
    /// Job equals the hash computed from its config.
    pub fn verify_hash(&self) -> bool {
        self.id.hash() == Some(self.config.job_hash().as_str())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    /// Create a builder with test defaults.
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    name: String,
    version: String,
    image: String,
    command: Vec<String>,
    env: BTreeMap<String, String>,
    ports: BTreeMap<String, PortMapping>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            name: "test-job".to_string(),
            version: "1".to_string(),
            image: "busybox:latest".to_string(),
            command: Vec::new(),
            env: BTreeMap::new(),
            ports: BTreeMap::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    pub fn version(mut self, v: impl Into<String>) -> Self {
        self.version = v.into();
        self
    }

    pub fn image(mut self, v: impl Into<String>) -> Self {
        self.image = v.into();
        self
    }

    pub fn command(mut self, v: Vec<String>) -> Self {
        self.command = v;
        self
    }

    pub fn env(mut self, v: BTreeMap<String, String>) -> Self {
        self.env = v;
        self
    }

    pub fn ports(mut self, v: BTreeMap<String, PortMapping>) -> Self {
        self.ports = v;
        self
    }

    /// Build the Job, panicking on validation failure (test convenience
    /// only — the non-test path always goes through `JobConfig::build`).
    pub fn build(self) -> Job {
        JobConfig {
            name: self.name,
            version: self.version,
            image: self.image,
            command: self.command,
            env: self.env,
            ports: self.ports,
        }
        .build(None)
        .expect("JobBuilder produced an invalid config")
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
