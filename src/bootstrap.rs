//! ThemeRuntime: one page/session's worth of detected features and utilities.
//!
//! Bootstrap probes the host exactly once; the resulting CapabilityMap is
//! handed out by reference for the rest of the session. The module loader is
//! built from the same map and resolves its backend on first utility use.

use std::sync::Arc;

use crate::config::ThemeConfig;
use crate::features::host::HostEnvironment;
use crate::features::{detect_features, CapabilityMap};
use crate::loader::source::AssetSource;
use crate::loader::{ModuleLoader, Utilities};

pub struct ThemeRuntime {
    features: CapabilityMap,
    loader: ModuleLoader,
}

impl ThemeRuntime {
    /// Detect features and prepare the loader from `config`.
    pub fn bootstrap(host: &dyn HostEnvironment, config: &ThemeConfig) -> Self {
        Self::with_source(host, config.asset_source(), config)
    }

    /// Like `bootstrap`, with an explicit asset source.
    pub fn with_source(
        host: &dyn HostEnvironment,
        source: Arc<dyn AssetSource>,
        config: &ThemeConfig,
    ) -> Self {
        let features = detect_features(host);
        let loader = ModuleLoader::new(&features, source, config.wasm_module.clone())
            .with_wasm_disabled(config.disable_wasm);
        Self { features, loader }
    }

    pub fn features(&self) -> &CapabilityMap {
        &self.features
    }

    /// The feature map as the JSON object the theme publishes to its scripts.
    pub fn features_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.features)
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Utilities, waiting for the loader's single initialization.
    pub async fn utilities(&self) -> &Utilities {
        self.loader.utilities().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::error::ProbeError;
    use crate::features::host::{HostProfile, HostValue};
    use crate::features::Capability;
    use crate::loader::source::FsAssetSource;
    use crate::loader::LoaderState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a profile and counts every probe.
    struct CountingHost {
        inner: HostProfile,
        probes: AtomicUsize,
    }

    impl HostEnvironment for CountingHost {
        fn lookup(&self, path: &[&str]) -> Result<HostValue, ProbeError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(path)
        }

        fn css_supports(&self, condition: &str) -> Result<bool, ProbeError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.inner.css_supports(condition)
        }
    }

    fn empty_theme() -> (tempfile::TempDir, Arc<dyn AssetSource>) {
        let dir = tempfile::TempDir::new().unwrap();
        let source: Arc<dyn AssetSource> = Arc::new(FsAssetSource::new(dir.path()));
        (dir, source)
    }

    #[tokio::test]
    async fn detection_happens_once() {
        let host = CountingHost {
            inner: HostProfile::modern(),
            probes: AtomicUsize::new(0),
        };
        let (_dir, source) = empty_theme();
        let runtime = ThemeRuntime::with_source(&host, source, &ThemeConfig::default());
        let after_bootstrap = host.probes.load(Ordering::SeqCst);
        assert!(after_bootstrap > 0);

        for _ in 0..5 {
            assert!(runtime.features().supports(Capability::Wasm));
        }
        runtime.utilities().await;
        assert_eq!(host.probes.load(Ordering::SeqCst), after_bootstrap);
    }

    #[tokio::test]
    async fn missing_module_file_falls_back() {
        let (_dir, source) = empty_theme();
        let runtime =
            ThemeRuntime::with_source(&HostProfile::modern(), source, &ThemeConfig::default());
        let utils = runtime.utilities().await;
        assert_eq!(runtime.loader().state(), LoaderState::Fallback);
        assert_eq!(utils.sanitize_html("<p>x</p><script>y</script>"), "<p>x</p>");
    }

    #[tokio::test]
    async fn config_can_disable_wasm() {
        let (_dir, source) = empty_theme();
        let config = ThemeConfig {
            disable_wasm: true,
            ..Default::default()
        };
        let runtime = ThemeRuntime::with_source(&HostProfile::modern(), source, &config);
        assert!(!runtime.utilities().await.is_loaded());
        // Detection itself is unaffected.
        assert!(runtime.features().supports(Capability::Wasm));
    }

    #[test]
    fn features_json_is_flat_object() {
        let (_dir, source) = empty_theme();
        let runtime =
            ThemeRuntime::with_source(&HostProfile::baseline(), source, &ThemeConfig::default());
        let json = runtime.features_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["wasm"], false);
        assert_eq!(value["hasSelector"], false);
        assert_eq!(value.as_object().unwrap().len(), 11);
    }
}
