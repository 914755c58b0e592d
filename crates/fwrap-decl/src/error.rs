use thiserror::Error;

/// Errors produced while building or loading a declaration graph.
#[derive(Debug, Error)]
pub enum DeclError {
    #[error("cannot parse type '{input}': {reason}")]
    TypeParse { input: String, reason: String },

    #[error("malformed declaration graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("declaration '{name}': {reason}")]
    InvalidDecl { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DeclError>;
