//! Error types for runtime infrastructure.

use thiserror::Error;

/// Errors raised by runtime setup.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for wrapped errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias used throughout the runtime crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_detail() {
        let err = Error::Config("bad filter".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad filter");
    }
}
