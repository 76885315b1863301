use thiserror::Error;

/// Errors surfaced by the service façade.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error(transparent)]
    Library(#[from] core_library::LibraryError),

    #[error(transparent)]
    Refresh(#[from] core_refresh::RefreshError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
