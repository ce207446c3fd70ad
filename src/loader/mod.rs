//! Capability-gated module loader: compiled WASM utilities with native fallbacks.
//!
//! The loader decides once per session which backend answers utility calls:
//! the compiled component (`Loaded`) or the native implementations
//! (`Fallback`). It only tries the component when the host reports `wasm`
//! support, and any fetch, compile or instantiate failure settles on
//! `Fallback` for good. Both states are terminal.
//!
//! Architecture:
//! - `source.rs`: AssetSource: theme-relative fetch from disk or HTTP
//! - `runtime.rs`: WasmRuntime / UtilityModule: wasmtime component calls
//! - `error.rs`: LoaderError

pub mod error;
pub mod runtime;
pub mod source;

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::features::{Capability, CapabilityMap};
use crate::utilities::{self, UtilityError};
use error::LoaderError;
use runtime::{UtilityModule, WasmRuntime};
use source::AssetSource;

/// Observable loader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Uninitialized,
    Loaded,
    Fallback,
}

/// Resolves the utility backend on first use and memoizes it.
pub struct ModuleLoader {
    features: CapabilityMap,
    source: Arc<dyn AssetSource>,
    module_path: String,
    disabled: bool,
    utilities: OnceCell<Utilities>,
}

impl ModuleLoader {
    pub fn new(
        features: &CapabilityMap,
        source: Arc<dyn AssetSource>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            features: *features,
            source,
            module_path: module_path.into(),
            disabled: false,
            utilities: OnceCell::new(),
        }
    }

    /// Skip the component entirely, as if the host lacked `wasm`.
    pub fn with_wasm_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The utilities, initializing the backend on first call.
    ///
    /// Concurrent first callers share one initialization attempt.
    pub async fn utilities(&self) -> &Utilities {
        self.utilities.get_or_init(|| self.initialize()).await
    }

    pub fn state(&self) -> LoaderState {
        match self.utilities.get() {
            None => LoaderState::Uninitialized,
            Some(u) if u.is_loaded() => LoaderState::Loaded,
            Some(_) => LoaderState::Fallback,
        }
    }

    async fn initialize(&self) -> Utilities {
        let web_crypto = self.features.supports(Capability::WebCrypto);

        if self.disabled {
            info!("WASM utilities disabled by configuration, using native fallbacks");
            return Utilities::fallback(web_crypto);
        }
        if !self.features.supports(Capability::Wasm) {
            info!("host lacks WebAssembly, using native fallbacks");
            return Utilities::fallback(web_crypto);
        }

        let location = self.source.describe(&self.module_path);
        match self.load().await {
            Ok(module) => {
                info!("WASM utilities loaded from {location}");
                Utilities::loaded(Arc::new(module), web_crypto)
            }
            Err(e) => {
                warn!("WASM utilities unavailable ({location}): {e}; using native fallbacks");
                Utilities::fallback(web_crypto)
            }
        }
    }

    async fn load(&self) -> Result<UtilityModule, LoaderError> {
        let bytes = self.source.fetch(&self.module_path).await?;

        // Compilation is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let runtime = WasmRuntime::new()?;
            runtime.load_module(&bytes)
        })
        .await
        .map_err(|e| LoaderError::Compilation(format!("compile task panicked: {e}")))?
    }
}

enum Backend {
    Loaded(Arc<UtilityModule>),
    Fallback,
}

/// The three utility operations, backed by whichever implementation the
/// loader settled on. Signatures do not depend on the backend.
pub struct Utilities {
    backend: Backend,
    web_crypto: bool,
}

impl Utilities {
    /// Native implementations only. `web_crypto` gates `hash_password`.
    pub fn fallback(web_crypto: bool) -> Self {
        Self {
            backend: Backend::Fallback,
            web_crypto,
        }
    }

    fn loaded(module: Arc<UtilityModule>, web_crypto: bool) -> Self {
        Self {
            backend: Backend::Loaded(module),
            web_crypto,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.backend, Backend::Loaded(_))
    }

    /// Minutes to read `content` at 200 words per minute, rounded up.
    pub fn estimate_reading_time(&self, content: &str) -> u32 {
        if let Backend::Loaded(module) = &self.backend {
            match module.estimate_reading_time(content) {
                Ok(minutes) => return minutes,
                Err(e) => warn!("WASM reading time failed, using native: {e}"),
            }
        }
        utilities::estimate_reading_time(content)
    }

    /// Strip `<script>` elements. See `utilities::sanitize` for the limits.
    pub fn sanitize_html(&self, markup: &str) -> String {
        if let Backend::Loaded(module) = &self.backend {
            match module.sanitize_html(markup) {
                Ok(clean) => return clean,
                Err(e) => warn!("WASM sanitize failed, using native: {e}"),
            }
        }
        utilities::sanitize_html(markup)
    }

    /// Lowercase hex digest of `password`.
    ///
    /// Fails with `Unsupported` when the native path is needed and the host
    /// has no digest primitive.
    pub async fn hash_password(&self, password: &str) -> Result<String, UtilityError> {
        if let Backend::Loaded(module) = &self.backend {
            let module = Arc::clone(module);
            let input = password.to_string();
            match tokio::task::spawn_blocking(move || module.hash_password(&input)).await {
                Ok(Ok(digest)) if utilities::is_digest_hex(&digest) => return Ok(digest),
                Ok(Ok(digest)) => warn!(
                    "WASM hash returned malformed digest ({} chars), using native",
                    digest.len()
                ),
                Ok(Err(e)) => warn!("WASM hash failed, using native: {e}"),
                Err(e) => warn!("WASM hash task panicked, using native: {e}"),
            }
        }

        if !self.web_crypto {
            return Err(UtilityError::Unsupported(
                "host has no crypto.subtle.digest".into(),
            ));
        }
        Ok(utilities::sha256_hex(password))
    }
}
