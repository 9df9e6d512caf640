//! Term manager configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// How strictly resource IRIs are checked before they are interned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IriPolicy {
    /// Reject only empty, oversized, or syntactically unsafe strings. Accepts
    /// prefixed names such as `jets:key` and relative references.
    #[default]
    Lenient,
    /// Additionally require a parseable absolute IRI (RFC 3987).
    Strict,
}

/// Configuration for a [`TermManager`](crate::manager::TermManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermManagerConfig {
    /// Expected number of terms (pre-allocation hint for the term table).
    pub capacity_hint: usize,
    /// IRI validation policy.
    pub iri_policy: IriPolicy,
    /// Maximum byte length of any IRI, label, literal value, or tag.
    pub max_term_bytes: usize,
}

impl Default for TermManagerConfig {
    fn default() -> Self {
        Self {
            capacity_hint: 1024,
            iri_policy: IriPolicy::Lenient,
            max_term_bytes: 64 * 1024,
        }
    }
}

impl TermManagerConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Self::parse_named(content, "<inline>")
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_named(&content, &path.display().to_string())
    }

    fn parse_named(content: &str, path: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_term_bytes == 0 {
            return Err(ConfigError::Invalid {
                message: "max_term_bytes must be > 0".into(),
            });
        }
        Ok(())
    }
}
