//! Site settings loader

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file
pub const SITE_ENV_VAR: &str = "VHOSTPATCH_SITE";

/// Settings loader for TOML and JSON files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a file, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let site = match ext {
            "json" => Self::from_json(&content)?,
            "toml" | "" => Self::from_toml(&content)?,
            _ => return Err(Error::Config(format!("Unknown settings format: {}", ext))),
        };

        site.validate()?;
        tracing::debug!("📄 Loaded site settings for {} from {:?}", site.server_name, path);
        Ok(site)
    }

    /// Parse JSON settings
    pub fn from_json(content: &str) -> Result<SiteConfig> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))
    }

    /// Parse TOML settings
    pub fn from_toml(content: &str) -> Result<SiteConfig> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Per-user settings file, `<config dir>/vhostpatch/site.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vhostpatch").join("site.toml"))
    }

    /// Pick the settings file to use.
    ///
    /// An explicit path wins, then the `VHOSTPATCH_SITE` variable, then the
    /// per-user file when it exists. `None` means built-in defaults.
    pub fn locate(explicit: Option<&Path>, env_value: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(value));
        }
        Self::default_path().filter(|p| p.is_file())
    }

    /// Resolve and load settings, falling back to the defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<SiteConfig> {
        let env_value = std::env::var(SITE_ENV_VAR).ok();
        match Self::locate(explicit, env_value.as_deref()) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No site settings file found, using built-in defaults");
                Ok(SiteConfig::default())
            }
        }
    }
}
