//! Generator registry for attributing assets to the tool that wrote them

use glance_core::{GlanceError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUILTIN_REGISTRY: &str = include_str!("registry.toml");

/// A known generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorEntry {
    /// Exact generator string, or a glob when it contains `*`
    #[serde(default)]
    pub generator: String,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl GeneratorEntry {
    /// Check whether this entry matches a report's generator string
    pub fn matches(&self, generator: &str) -> bool {
        if self.generator.is_empty() || generator.is_empty() {
            return false;
        }

        if self.generator.contains('*') {
            match glob::Pattern::new(&wildcard_pattern(&self.generator)) {
                Ok(pattern) => pattern.matches(generator),
                Err(e) => {
                    log::warn!("Skipping invalid generator pattern '{}': {}", self.generator, e);
                    false
                }
            }
        } else {
            self.generator == generator
        }
    }

    /// Name shown to the user, `"{name} by {author}"` when they differ
    pub fn display_name(&self) -> String {
        if self.author.is_empty() || self.name == self.author {
            self.name.clone()
        } else {
            format!("{} by {}", self.name, self.author)
        }
    }
}

/// Glob source where only `*` is special; `?` and `[...]` match literally
fn wildcard_pattern(generator: &str) -> String {
    let mut pattern = String::new();
    for (i, segment) in generator.split('*').enumerate() {
        if i > 0 && !pattern.ends_with('*') {
            pattern.push('*');
        }
        pattern.push_str(&glob::Pattern::escape(segment));
    }
    pattern
}

/// A registry entry matched against a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorMatch {
    pub entry: GeneratorEntry,
    pub display_name: String,
}

/// TOML file format for registry definitions
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    tool: Vec<GeneratorEntry>,
}

/// JSON registry format (`{ "tools": [...] }`)
#[derive(Debug, Deserialize)]
struct JsonRegistryFile {
    #[serde(default)]
    tools: Vec<GeneratorEntry>,
}

/// Ordered, read-only list of known generators
#[derive(Debug, Default, Clone)]
pub struct GeneratorRegistry {
    entries: Vec<GeneratorEntry>,
}

impl GeneratorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shipped with Glance
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        if let Err(e) = registry.load_string(BUILTIN_REGISTRY) {
            log::error!("Built-in generator registry is invalid: {}", e);
        }
        registry
    }

    /// Load a registry file; `.json` files use the `tools` array format
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut registry = Self::new();

        if path.extension().map(|e| e == "json").unwrap_or(false) {
            registry.load_json(&content)?;
        } else {
            registry.load_string(&content)?;
        }

        Ok(registry)
    }

    /// Append entries from a TOML string with `[[tool]]` tables
    pub fn load_string(&mut self, content: &str) -> Result<()> {
        let file: RegistryFile = toml::from_str(content).map_err(|e| {
            GlanceError::RegistryError(format!("Failed to parse registry TOML: {}", e))
        })?;
        self.entries.extend(file.tool);
        Ok(())
    }

    /// Append entries from a JSON string with a `tools` array
    pub fn load_json(&mut self, content: &str) -> Result<()> {
        let file: JsonRegistryFile = serde_json::from_str(content).map_err(|e| {
            GlanceError::RegistryError(format!("Failed to parse registry JSON: {}", e))
        })?;
        self.entries.extend(file.tools);
        Ok(())
    }

    /// Register an entry directly
    pub fn register(&mut self, entry: GeneratorEntry) {
        self.entries.push(entry);
    }

    /// Find the first entry matching a generator string
    pub fn find(&self, generator: &str) -> Option<GeneratorMatch> {
        self.entries
            .iter()
            .find(|entry| entry.matches(generator))
            .map(|entry| GeneratorMatch {
                display_name: entry.display_name(),
                entry: entry.clone(),
            })
    }

    pub fn all(&self) -> &[GeneratorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
