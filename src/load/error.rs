use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to open settings document '{origin}': {source}")]
    Open {
        origin: String,
        source: std::io::Error,
    },

    #[error("failed to parse settings document '{origin}': {source}")]
    Parse {
        origin: String,
        source: DocumentError,
    },
}

/// A syntax error reported by the document parser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
