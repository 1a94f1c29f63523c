//! Configuration file support for Pulse
//!
//! Loads report configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.pulserc.json` in the working directory
//! 3. `pulse.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! Scoring weights and status thresholds are deliberately absent: every surface
//! must produce the same score for the same snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pulse configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    /// Glob patterns over program ids to include (default: all programs)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns over program ids to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Fixed reference instant (RFC 3339) for overdue checks; default is the current clock
    #[serde(default)]
    pub reference_time: Option<String>,

    /// Only report programs scoring at or below this value
    #[serde(default)]
    pub max_score: Option<u8>,

    /// Maximum number of programs to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Reference instant (None means use the clock at evaluation time)
    pub reference_time: Option<DateTime<Utc>>,
    /// Filters
    pub max_score: Option<u8>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl PulseConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_score {
            if max > 100 {
                anyhow::bail!("max_score must be between 0 and 100 (got {})", max);
            }
        }

        if let Some(top) = self.top {
            if top == 0 {
                anyhow::bail!("top must be at least 1");
            }
        }

        if let Some(ref raw) = self.reference_time {
            parse_reference_time(raw)?;
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.include {
                builder.add(Glob::new(pattern)?);
            }
            Some(builder.build()?)
        };

        let exclude = {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.exclude {
                builder.add(Glob::new(pattern)?);
            }
            builder.build()?
        };

        let reference_time = self
            .reference_time
            .as_deref()
            .map(parse_reference_time)
            .transpose()?;

        Ok(ResolvedConfig {
            include,
            exclude,
            reference_time,
            max_score: self.max_score,
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a program id should be reported based on include/exclude patterns
    pub fn should_include(&self, program_id: &str) -> bool {
        // Check exclude first
        if self.exclude.is_match(program_id) {
            return false;
        }

        // If include patterns exist, the id must match at least one
        if let Some(ref include) = self.include {
            return include.is_match(program_id);
        }

        true
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        PulseConfig::default().resolve()
    }
}

/// Parse an RFC 3339 reference instant
pub fn parse_reference_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("reference_time must be an RFC 3339 timestamp (got {:?})", raw))
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.pulserc.json`
/// 2. `pulse.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(PulseConfig, PathBuf)>> {
    for name in [".pulserc.json", "pulse.config.json"] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<PulseConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: PulseConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (PulseConfig::default(), None),
        }
    };

    if let Some(ref path) = source_path {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
