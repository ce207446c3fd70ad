//! Error types for the module loader.

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("invalid asset path '{path}': {reason}")]
    InvalidAssetPath { path: String, reason: String },
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("engine creation failed: {0}")]
    EngineCreation(String),
    #[error("module compilation failed: {0}")]
    Compilation(String),
    #[error("instantiation failed: {0}")]
    Instantiation(String),
    #[error("missing export '{0}'")]
    MissingExport(String),
    #[error("module call failed: {0}")]
    Execution(String),
}
