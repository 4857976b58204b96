use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authentication error: {0}")]
    #[diagnostic(code(voice_agent::authentication))]
    Authentication(String),

    #[error("{0}")]
    #[diagnostic(code(voice_agent::invalid_input))]
    InvalidInput(String),

    #[error("Could not determine {0}")]
    #[diagnostic(
        code(voice_agent::missing_field),
        help("Try the request again and mention when it should happen")
    )]
    MissingField(String),

    #[error("Intent resolution failed: {0}")]
    #[diagnostic(code(voice_agent::resolution))]
    Resolution(String),

    #[error("Could not parse the resolved intent: {0}")]
    #[diagnostic(code(voice_agent::parse))]
    Parse(String),

    #[error("Google API error: {0}")]
    #[diagnostic(code(voice_agent::backend))]
    Backend(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(voice_agent::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(voice_agent::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(voice_agent::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(voice_agent::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(voice_agent::other))]
    Other(String),
}

/// Coarse classification of an error, used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    InvalidInput,
    MissingField,
    Resolution,
    Backend,
    Internal,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::MissingField(_) => ErrorKind::MissingField,
            Error::Resolution(_) | Error::Parse(_) => ErrorKind::Resolution,
            Error::Backend(_) => ErrorKind::Backend,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AgentResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create intent resolution errors
pub fn resolution_error(message: &str) -> Error {
    Error::Resolution(message.to_string())
}

/// Helper to create intent parsing errors
pub fn parse_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}

/// Helper to create Google API errors
pub fn backend_error(message: &str) -> Error {
    Error::Backend(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
