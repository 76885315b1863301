use thiserror::Error;

/// Failure of a remote document store operation.
///
/// The sync layer assumes no finer-grained taxonomy from the store: network
/// failures, quota exhaustion and permission problems all surface as a single
/// `Unavailable` condition. The type is `Clone` so coalesced fetches can hand
/// the same settled failure to every attached caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("remote operation failed: {0}")]
    Unavailable(String),
}

/// Errors from non-store bridge capabilities (settings, visibility).
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
