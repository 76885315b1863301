//! Specialized repositories for the library's entity kinds.
//!
//! Each specialization composes a [`CachedRepository`](crate::repository::CachedRepository)
//! rather than extending it: the generic cache/coalescing logic stays
//! entity-agnostic, and domain queries (natural-key lookups, soft-delete
//! partitioning, counters) live here.

mod book;
mod genre;
mod wishlist;

pub use book::BookRepository;
pub use genre::GenreRepository;
pub use wishlist::WishlistRepository;
