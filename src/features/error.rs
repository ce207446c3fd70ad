//! Error types for host probing.

/// A probe that could not be answered by the host.
///
/// Never escapes detection: the detector logs it and reports the
/// capability as unsupported.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("property access failed at '{path}': {reason}")]
    Access { path: String, reason: String },
    #[error("feature query failed for '{condition}': {reason}")]
    FeatureQuery { condition: String, reason: String },
}
