//! Theme configuration: where the module lives and which host to assume.
//!
//! User-level config: `~/.sinople/config.yaml`
//! Project-level config: `.sinople/config.yaml` (overrides user values)
//! Environment: `SINOPLE_ASSET_BASE_URL`, `SINOPLE_DISABLE_WASM` (override both)
//!
//! Implicitly discovered files that are missing or unreadable are skipped.
//! A file named explicitly with `load_from` must parse.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::features::host::HostProfile;
use crate::loader::source::{AssetSource, FsAssetSource, HttpAssetSource, DEFAULT_MODULE_PATH};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Theme directory used by the filesystem asset source.
    pub theme_root: PathBuf,
    /// Theme-relative path of the compiled utilities module.
    pub wasm_module: String,
    /// Public base URL of the theme; when set, the module is fetched over HTTP.
    pub asset_base_url: Option<String>,
    /// Host profile YAML; the modern preset when absent.
    pub host_profile: Option<PathBuf>,
    pub disable_wasm: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme_root: PathBuf::from("."),
            wasm_module: DEFAULT_MODULE_PATH.into(),
            asset_base_url: None,
            host_profile: None,
            disable_wasm: false,
        }
    }
}

/// One config file's worth of overrides. Absent keys leave values alone.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    theme_root: Option<PathBuf>,
    #[serde(default)]
    wasm_module: Option<String>,
    #[serde(default)]
    asset_base_url: Option<String>,
    #[serde(default)]
    host_profile: Option<PathBuf>,
    #[serde(default)]
    disable_wasm: Option<bool>,
}

/// Path to `~/.sinople/config.yaml`.
fn user_config_path() -> Option<PathBuf> {
    #[cfg(windows)]
    let home = std::env::var("USERPROFILE").ok();
    #[cfg(not(windows))]
    let home = std::env::var("HOME").ok();

    home.map(|h| PathBuf::from(h).join(".sinople").join("config.yaml"))
}

const PROJECT_CONFIG: &str = ".sinople/config.yaml";

impl ThemeConfig {
    /// Discover and merge user + project config, then apply env overrides.
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Some(path) = user_config_path() {
            if let Some(layer) = Self::read_layer_lenient(&path) {
                config.apply(layer);
            }
        }
        if let Some(layer) = Self::read_layer_lenient(Path::new(PROJECT_CONFIG)) {
            config.apply(layer);
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load one explicit config file over the defaults, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply(Self::read_layer(path)?);
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse YAML over the defaults (no env overrides).
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mut config = Self::default();
        config.apply(serde_yaml::from_str(yaml)?);
        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        // An empty file is a valid, empty layer.
        if content.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn read_layer_lenient(path: &Path) -> Option<ConfigLayer> {
        match Self::read_layer(path) {
            Ok(layer) => Some(layer),
            Err(ConfigError::Read { .. }) => None,
            Err(e) => {
                tracing::warn!("ignoring config: {e}");
                None
            }
        }
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(root) = layer.theme_root {
            self.theme_root = root;
        }
        if let Some(module) = layer.wasm_module {
            self.wasm_module = module;
        }
        if layer.asset_base_url.is_some() {
            self.asset_base_url = layer.asset_base_url;
        }
        if layer.host_profile.is_some() {
            self.host_profile = layer.host_profile;
        }
        if let Some(disabled) = layer.disable_wasm {
            self.disable_wasm = disabled;
        }
    }

    /// Apply environment overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SINOPLE_ASSET_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.asset_base_url = Some(url);
        }
        if let Some(flag) = var("SINOPLE_DISABLE_WASM") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.disable_wasm = true,
                "0" | "false" | "no" | "off" => self.disable_wasm = false,
                other => tracing::warn!("ignoring SINOPLE_DISABLE_WASM={other}"),
            }
        }
    }

    /// The asset source implied by this config: HTTP when a base URL is set,
    /// otherwise the theme directory.
    pub fn asset_source(&self) -> Arc<dyn AssetSource> {
        match &self.asset_base_url {
            Some(url) => Arc::new(HttpAssetSource::new(url.clone())),
            None => Arc::new(FsAssetSource::new(self.theme_root.clone())),
        }
    }

    /// The host profile to detect against.
    pub fn host(&self) -> Result<HostProfile, ConfigError> {
        match &self.host_profile {
            Some(path) => HostProfile::load(path),
            None => Ok(HostProfile::modern()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ThemeConfig::default();
        assert_eq!(config.wasm_module, "assets/js/dist/sinople_utils.wasm");
        assert_eq!(config.theme_root, PathBuf::from("."));
        assert!(config.asset_base_url.is_none());
        assert!(!config.disable_wasm);
    }

    #[test]
    fn load_from_yaml_string() {
        let yaml = r#"
theme_root: /srv/www/wp-content/themes/sinople
asset_base_url: https://example.org/wp-content/themes/sinople
disable_wasm: true
"#;
        let config = ThemeConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.theme_root,
            PathBuf::from("/srv/www/wp-content/themes/sinople")
        );
        assert_eq!(
            config.asset_base_url.as_deref(),
            Some("https://example.org/wp-content/themes/sinople")
        );
        assert!(config.disable_wasm);
        // Unset keys keep their defaults
        assert_eq!(config.wasm_module, DEFAULT_MODULE_PATH);
    }

    #[test]
    fn later_layers_override_earlier() {
        let mut config = ThemeConfig::default();
        config.apply(ConfigLayer {
            wasm_module: Some("assets/user.wasm".into()),
            disable_wasm: Some(true),
            ..Default::default()
        });
        config.apply(ConfigLayer {
            disable_wasm: Some(false),
            ..Default::default()
        });
        assert_eq!(config.wasm_module, "assets/user.wasm");
        assert!(!config.disable_wasm);
    }

    #[test]
    fn env_overrides() {
        let mut config = ThemeConfig::default();
        config.apply_env(env(&[
            ("SINOPLE_ASSET_BASE_URL", "https://cdn.example.org/theme"),
            ("SINOPLE_DISABLE_WASM", "yes"),
        ]));
        assert_eq!(
            config.asset_base_url.as_deref(),
            Some("https://cdn.example.org/theme")
        );
        assert!(config.disable_wasm);
    }

    #[test]
    fn unrecognised_env_flag_is_ignored() {
        let mut config = ThemeConfig::default();
        config.apply_env(env(&[("SINOPLE_DISABLE_WASM", "maybe")]));
        assert!(!config.disable_wasm);
    }

    #[test]
    fn empty_base_url_env_is_ignored() {
        let mut config = ThemeConfig::default();
        config.apply_env(env(&[("SINOPLE_ASSET_BASE_URL", "  ")]));
        assert!(config.asset_base_url.is_none());
    }

    #[test]
    fn explicit_file_must_parse() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "disable_wasm: [not, a, bool]\n").unwrap();
        assert!(matches!(
            ThemeConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        assert!(matches!(
            ThemeConfig::load_from(Path::new("/nonexistent/sinople.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn empty_file_is_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        let mut config = ThemeConfig::default();
        config.apply(ThemeConfig::read_layer(&path).unwrap());
        assert_eq!(config, ThemeConfig::default());
    }

    #[test]
    fn lenient_read_skips_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, ":::: not yaml ::::\n  - [").unwrap();
        assert!(ThemeConfig::read_layer_lenient(&path).is_none());
    }

    #[test]
    fn default_host_is_modern() {
        let host = ThemeConfig::default().host().unwrap();
        assert_eq!(host.name, "modern");
    }

    #[test]
    fn host_profile_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legacy.yaml");
        std::fs::write(&path, "name: legacy\nglobals: {}\n").unwrap();
        let config = ThemeConfig {
            host_profile: Some(path),
            ..Default::default()
        };
        assert_eq!(config.host().unwrap().name, "legacy");
    }
}
