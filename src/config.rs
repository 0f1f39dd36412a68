// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Render configuration system
//!
//! Layered as defaults, then `solidgraph.toml`, then `SOLIDGRAPH_*`
//! environment variables. The CLI applies its flags last.

use crate::ast::ReferencePolicy;
use crate::geometry::{BooleanKernel, BspKernel};
use crate::io::StlEncoding;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "solidgraph.toml";

/// Render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// When operand references are checked
    pub reference_policy: ReferencePolicy,
    /// Plane thickness used by the BSP boolean kernel
    pub boolean_epsilon: f64,
    /// STL flavour written by `render`
    pub stl_encoding: StlEncoding,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            reference_policy: ReferencePolicy::Strict,
            boolean_epsilon: BspKernel::DEFAULT_EPSILON,
            stl_encoding: StlEncoding::Binary,
        }
    }
}

impl RenderConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: RenderConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.check()?;
        Ok(config)
    }

    /// Load `path`, or `solidgraph.toml` if present, then apply environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `SOLIDGRAPH_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = lookup("SOLIDGRAPH_REFERENCE_POLICY") {
            self.reference_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid SOLIDGRAPH_REFERENCE_POLICY")?;
        }

        if let Some(epsilon) = lookup("SOLIDGRAPH_BOOLEAN_EPSILON") {
            self.boolean_epsilon = epsilon
                .parse()
                .with_context(|| format!("Invalid SOLIDGRAPH_BOOLEAN_EPSILON: {:?}", epsilon))?;
        }

        if let Some(encoding) = lookup("SOLIDGRAPH_STL_ENCODING") {
            self.stl_encoding = encoding
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid SOLIDGRAPH_STL_ENCODING")?;
        }

        self.check()
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Boolean kernel configured by this file
    pub fn boolean_kernel(&self) -> Arc<dyn BooleanKernel> {
        Arc::new(BspKernel::new(self.boolean_epsilon))
    }

    fn check(&self) -> Result<()> {
        if !(self.boolean_epsilon.is_finite() && self.boolean_epsilon > 0.0) {
            bail!(
                "boolean_epsilon must be a positive number, got {}",
                self.boolean_epsilon
            );
        }
        Ok(())
    }
}
