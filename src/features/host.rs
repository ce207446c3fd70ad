//! Host environments: the surface the detector probes.
//!
//! A host answers two questions: what lives at a dotted global path, and
//! whether a CSS feature query is supported. Browsers, embeddings and test
//! doubles all implement `HostEnvironment`; `HostProfile` is the declarative
//! implementation loaded from YAML.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ProbeError;
use crate::config::ConfigError;

/// Shape of a value found at a global path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostValue {
    Undefined,
    Object,
    Function,
}

impl HostValue {
    pub fn is_defined(self) -> bool {
        !matches!(self, HostValue::Undefined)
    }

    pub fn is_callable(self) -> bool {
        matches!(self, HostValue::Function)
    }
}

/// Read-only view of a host's globals and CSS support.
///
/// Implementations must not invoke the features they describe.
pub trait HostEnvironment: Send + Sync {
    /// Resolve a property path from the global object, e.g. `["navigator", "gpu"]`.
    /// An empty path is the global object itself.
    fn lookup(&self, path: &[&str]) -> Result<HostValue, ProbeError>;

    /// Evaluate a CSS feature query such as `container-type: inline-size`.
    fn css_supports(&self, condition: &str) -> Result<bool, ProbeError>;
}

/// Declared kind of a global in a host profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalKind {
    Function,
    Object,
}

/// Declarative host description.
///
/// ```yaml
/// name: safari-17
/// globals:
///   IntersectionObserver: function
///   navigator.share: function
/// css:
///   - "container-type: inline-size"
/// ```
///
/// Parents of declared paths exist implicitly as objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub globals: BTreeMap<String, GlobalKind>,
    #[serde(default)]
    pub css: BTreeSet<String>,
}

impl HostProfile {
    /// A host with nothing optional available.
    pub fn baseline() -> Self {
        Self {
            name: "baseline".into(),
            ..Default::default()
        }
    }

    /// A host exposing every capability the detector knows about.
    pub fn modern() -> Self {
        let mut profile = Self {
            name: "modern".into(),
            ..Default::default()
        };
        for (path, kind) in [
            ("IntersectionObserver", GlobalKind::Function),
            ("ResizeObserver", GlobalKind::Function),
            ("document.startViewTransition", GlobalKind::Function),
            ("WebAssembly.instantiate", GlobalKind::Function),
            ("crypto.subtle.digest", GlobalKind::Function),
            ("navigator.gpu", GlobalKind::Object),
            ("RTCPeerConnection", GlobalKind::Function),
            ("showOpenFilePicker", GlobalKind::Function),
            ("navigator.share", GlobalKind::Function),
        ] {
            profile.define(path, kind);
        }
        profile.support_css("container-type: inline-size");
        profile.support_css("selector(:has(*))");
        profile
    }

    /// Parse a profile from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a profile from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Declare a global at a dotted path.
    pub fn define(&mut self, path: &str, kind: GlobalKind) -> &mut Self {
        self.globals.insert(path.to_string(), kind);
        self
    }

    /// Remove a global and everything declared beneath it.
    pub fn undefine(&mut self, path: &str) -> &mut Self {
        let nested = format!("{path}.");
        self.globals
            .retain(|k, _| k != path && !k.starts_with(&nested));
        self
    }

    /// Mark a CSS feature query as supported.
    pub fn support_css(&mut self, condition: &str) -> &mut Self {
        self.css.insert(condition.to_string());
        self
    }
}

impl HostEnvironment for HostProfile {
    fn lookup(&self, path: &[&str]) -> Result<HostValue, ProbeError> {
        if path.is_empty() {
            return Ok(HostValue::Object);
        }
        let joined = path.join(".");
        if let Some(kind) = self.globals.get(&joined) {
            return Ok(match kind {
                GlobalKind::Function => HostValue::Function,
                GlobalKind::Object => HostValue::Object,
            });
        }
        let nested = format!("{joined}.");
        if self.globals.keys().any(|k| k.starts_with(&nested)) {
            Ok(HostValue::Object)
        } else {
            Ok(HostValue::Undefined)
        }
    }

    fn css_supports(&self, condition: &str) -> Result<bool, ProbeError> {
        Ok(self.css.contains(condition.trim()))
    }
}
