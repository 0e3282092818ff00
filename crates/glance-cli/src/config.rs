//! Layered configuration system
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Command-line flags (applied by the commands)
//! 2. Environment variables: `GLANCE_REGISTRY`, `GLANCE_FETCH_TIMEOUT_SECS`, `GLANCE_REPORT_DIR`
//! 3. Project-local: `.glance/config.toml`
//! 4. Global: `~/.glance/config.toml`

use glance_asset::DEFAULT_FETCH_TIMEOUT_SECS;
use glance_core::{GlanceError, Result};
use glance_report::{AggregationPolicy, AggregationRule, GeneratorRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_REPORT_DIR: &str = ".glance/reports";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchSection {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySection {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlanceConfigFile {
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub report: ReportSection,
    /// Replaces the default aggregation policy when present
    #[serde(default)]
    pub aggregate: Option<Vec<AggregationRule>>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GlanceConfig {
    pub fetch_timeout_secs: u64,
    pub registry_path: Option<PathBuf>,
    pub report_dir: PathBuf,
    pub aggregate: Option<Vec<AggregationRule>>,
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            registry_path: None,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            aggregate: None,
        }
    }
}

impl GlanceConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".glance/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load defaults plus a single file, without environment overrides
    #[cfg(test)]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::load_file(path)?);
        Ok(config)
    }

    /// Aggregation policy from `[[aggregate]]`, or the default one
    pub fn policy(&self) -> AggregationPolicy {
        match &self.aggregate {
            Some(rules) => AggregationPolicy::new(rules.clone()),
            None => AggregationPolicy::default(),
        }
    }

    /// Generator registry: the flag wins over the configured path, else built-in
    pub fn registry(&self, flag: Option<&Path>) -> Result<GeneratorRegistry> {
        match flag.or(self.registry_path.as_deref()) {
            Some(path) => {
                log::info!("Loading generator registry from {}", path.display());
                GeneratorRegistry::load_file(path)
            }
            None => Ok(GeneratorRegistry::builtin()),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".glance").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<GlanceConfigFile> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| {
            GlanceError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn parse(content: &str) -> Result<GlanceConfigFile> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay a file's settings; unset values leave the current ones
    pub fn merge(&mut self, overlay: GlanceConfigFile) {
        if let Some(timeout) = overlay.fetch.timeout_secs {
            self.fetch_timeout_secs = timeout;
        }
        if overlay.registry.path.is_some() {
            self.registry_path = overlay.registry.path;
        }
        if let Some(dir) = overlay.report.output_dir {
            self.report_dir = dir;
        }
        if overlay.aggregate.is_some() {
            self.aggregate = overlay.aggregate;
        }
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("GLANCE_REGISTRY") {
            self.registry_path = Some(PathBuf::from(path));
        }
        if let Some(timeout) = lookup("GLANCE_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = timeout.trim().parse().map_err(|_| {
                GlanceError::ConfigError(format!(
                    "GLANCE_FETCH_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    timeout
                ))
            })?;
        }
        if let Some(dir) = lookup("GLANCE_REPORT_DIR") {
            self.report_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}
