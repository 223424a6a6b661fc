//! User-configured 404 overrides, loaded once per scan: `always_404`,
//! `never_404`, and `string_match_404` (spec §4.8, §6).
//!
//! Config *loading* is out of scope for the classifier core itself — this
//! crate exists because every complete crate in this stack ships its own
//! config layer, following the same `serde` + `toml` + `dirs` shape.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// On-disk representation of the classifier's user overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    always_404: HashSet<String>,
    never_404: HashSet<String>,
    string_match_404: Option<String>,
}

/// Read-only view of the classifier's user overrides for one scan (spec
/// §5: read-only after scan start).
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    always_404: HashSet<String>,
    never_404: HashSet<String>,
    string_match_404: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ClassifierConfig {
    #[must_use]
    pub fn new(always_404: HashSet<String>, never_404: HashSet<String>, string_match_404: Option<String>) -> Self {
        Self { always_404, never_404, string_match_404 }
    }

    /// Load from a TOML file. A missing file is not an error — an empty
    /// config is returned, since config loading itself is not the
    /// classifier's concern, only the resulting sets are.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };

        let raw: RawConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        Ok(Self::new(raw.always_404, raw.never_404, raw.string_match_404))
    }

    /// Default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("soft404").join("config.toml"))
    }

    #[must_use]
    pub fn is_always_404(&self, domain_path: &str) -> bool {
        self.always_404.contains(domain_path)
    }

    #[must_use]
    pub fn is_never_404(&self, domain_path: &str) -> bool {
        self.never_404.contains(domain_path)
    }

    #[must_use]
    pub fn string_match_404(&self) -> Option<&str> {
        self.string_match_404.as_deref()
    }
}
