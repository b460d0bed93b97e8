//! Error types for configuration loading and server startup
//!
//! Request-path failures never appear here. The dispatcher recovers those
//! into error envelopes before they can escape, so this type only covers
//! faults raised while a service is coming up or shutting down.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Startup and serve faults
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Manual From implementation for the boxed error
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
