use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised by refresh policy persistence.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Settings error: {0}")]
    Settings(#[from] BridgeError),

    #[error("Policy encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, RefreshError>;
