//! # Core Library
//!
//! Client-side synchronization layer for the personal library: typed models
//! over the remote document store, the generic caching repository, the
//! per-entity specializations, and bounded duplicate detection.
//!
//! - [`repository::CachedRepository`] - per-collection cache with coalesced
//!   fetches and mutation-driven invalidation
//! - [`repositories`] - Book, Genre, and Wishlist specializations
//! - [`duplicate::DuplicateDetector`] - two-tier, cost-bounded duplicate check
//! - [`normalize`] - free-text normalization shared with UI pre-checks

pub mod duplicate;
pub mod error;
pub mod models;
pub mod normalize;
pub mod repositories;
pub mod repository;

pub use duplicate::{DuplicateCandidate, DuplicateDetector, DuplicateMatch, MatchKind, SCAN_CAP};
pub use error::{LibraryError, Result};
pub use models::{
    Book, Entity, Genre, NewBook, NewGenre, NewWishlistItem, SoftDeletable, WishlistItem,
};
pub use normalize::normalize_text;
pub use repositories::{BookRepository, GenreRepository, WishlistRepository};
pub use repository::CachedRepository;
