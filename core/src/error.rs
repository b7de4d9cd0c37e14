use thiserror::Error;

/// Errors raised while loading tables or answering a query.
///
/// None of these are transient: the same input always produces the same
/// error, so callers should surface them rather than retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing startup input (tables, side files, config).
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("document not found: {0}")]
    DocumentNotFound(String),
    #[error("malformed doc id: {0}")]
    MalformedDocId(String),
    /// A topic vector with zero magnitude; valid topic-model output never has one.
    #[error("degenerate topic vector for {0}")]
    DegenerateVector(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
