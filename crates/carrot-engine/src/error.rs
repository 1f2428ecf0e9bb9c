//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: carrot_core::ConfigError,
    },

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An output line could not be serialized.
    #[error("output serialization error: {source}")]
    Output {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}

/// A stdin line that is not a command.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Plain text that names no known command.
    #[error("unknown command: {line}")]
    UnknownCommand {
        /// The offending line, trimmed.
        line: String,
    },

    /// A JSON line that is not a valid host message.
    #[error("invalid host message: {source}")]
    Message {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}
