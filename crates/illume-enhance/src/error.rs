//! Engine error taxonomy.

/// Error reported by a rendering engine or its loader.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine could not be constructed or reached.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// HTTP-level failure from an engine backed by a remote service.
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O failure while reading engine output.
    #[error("I/O error: {0}")]
    Io(String),

    /// Engine produced output the pipeline cannot embed.
    #[error("invalid engine output: {0}")]
    InvalidOutput(String),
}
