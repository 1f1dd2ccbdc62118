//! Error types for the certificate pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or dispatching certificates
#[derive(Error, Debug)]
pub enum Error {
    /// A template placeholder has no matching context value
    #[error("no value for template placeholder `${{{0}}}`")]
    MissingKey(String),

    /// A `${` placeholder was never closed
    #[error("malformed template placeholder near `{0}`")]
    Malformed(String),

    /// The expected output file never appeared within the wait budget
    #[error("timed out after {0}ms waiting for {1}")]
    Timeout(u64, String),

    /// Browser launch, navigation, or CDP command failure
    #[error("browser error: {0}")]
    Browser(String),

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Roster file could not be parsed
    #[error("roster error: {0}")]
    Roster(#[from] csv::Error),

    /// Mail session or send failure
    #[error("mail error: {0}")]
    Mail(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// headless_chrome surfaces its failures as anyhow errors.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Browser(err.to_string())
    }
}
