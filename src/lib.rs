//! Sinople progressive enhancement: feature detection and capability-gated
//! WASM utilities for the theme.
//!
//! Detects which optional platform features a host offers, then serves
//! reading-time, sanitization and password-hashing utilities from a compiled
//! component when the host can run one, and from native code when it can't.

pub mod bootstrap;
pub mod config;
pub mod features;
pub mod loader;
pub mod utilities;

pub use bootstrap::ThemeRuntime;
pub use features::{detect_features, Capability, CapabilityMap};
pub use loader::{LoaderState, ModuleLoader, Utilities};
