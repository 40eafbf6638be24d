use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelinkError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Version already exists: {0}")]
    DuplicateVersion(String),

    #[error("Invalid version label: {0}")]
    InvalidVersion(String),

    #[error("Node {node}: {reason}")]
    Node { node: String, reason: String },

    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl RelinkError {
    pub fn node(node: impl Into<String>, reason: impl Into<String>) -> Self {
        RelinkError::Node {
            node: node.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelinkError>;
