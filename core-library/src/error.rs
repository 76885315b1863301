use bridge_traits::StoreError;
use thiserror::Error;

/// Errors surfaced by repositories and the duplicate detector.
///
/// `Clone` because a coalesced fetch hands the same settled result to every
/// attached caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Remote error: {0}")]
    Remote(#[from] StoreError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl LibraryError {
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
