//! Error types for the utility operations.

#[derive(Debug, thiserror::Error)]
pub enum UtilityError {
    /// The host lacks the primitive an operation depends on.
    #[error("unsupported: {0}")]
    Unsupported(String),
}
