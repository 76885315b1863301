//! Bounded-cost duplicate detection for candidate books.
//!
//! Two tiers, in order of cost:
//! 1. An indexed equality query on ISBN, limited to one result.
//! 2. A linear scan over at most [`SCAN_CAP`] of the most recently added
//!    books, comparing title and author after normalization.
//!
//! Full-collection exact-text matching is unbounded in read cost against a
//! store billed per document access; the cap trades completeness
//! (duplicates beyond the scanned window are not detected) for predictable
//! cost. Purely a query: detection never mutates state.

use crate::error::Result;
use crate::models::Book;
use crate::normalize::normalize_text;
use crate::repositories::BookRepository;
use bridge_traits::store::{OrderDirection, QueryOptions, UserId};
use tracing::{debug, instrument};

/// Upper bound on entities examined by the normalized-identity scan.
pub const SCAN_CAP: usize = 200;

/// How a duplicate was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// ISBN equality.
    NaturalKey,
    /// Title and author equal after normalization.
    NormalizedIdentity,
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub is_duplicate: bool,
    pub match_kind: Option<MatchKind>,
    pub matched: Option<Book>,
}

impl DuplicateMatch {
    fn none() -> Self {
        Self {
            is_duplicate: false,
            match_kind: None,
            matched: None,
        }
    }

    fn found(kind: MatchKind, book: Book) -> Self {
        Self {
            is_duplicate: true,
            match_kind: Some(kind),
            matched: Some(book),
        }
    }
}

/// A book the user is about to add.
#[derive(Debug, Clone, Default)]
pub struct DuplicateCandidate {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
}

/// Decides whether a candidate book already exists in the user's library.
#[derive(Clone)]
pub struct DuplicateDetector {
    books: BookRepository,
}

impl DuplicateDetector {
    pub fn new(books: BookRepository) -> Self {
        Self { books }
    }

    /// Check a candidate against the existing library.
    ///
    /// An ISBN hit short-circuits regardless of the free-text fields; the
    /// normalized scan runs when no ISBN is supplied or the ISBN query
    /// misses.
    #[instrument(skip(self, candidate), fields(has_isbn = candidate.isbn.is_some()))]
    pub async fn check_for_duplicate(
        &self,
        user: &UserId,
        candidate: &DuplicateCandidate,
    ) -> Result<DuplicateMatch> {
        if let Some(isbn) = candidate.isbn.as_deref().filter(|s| !s.trim().is_empty()) {
            if let Some(existing) = self.books.find_by_isbn(user, isbn).await? {
                debug!(user = %user, "duplicate by natural key");
                return Ok(DuplicateMatch::found(MatchKind::NaturalKey, existing));
            }
        }

        let title = normalize_text(&candidate.title);
        let author = normalize_text(&candidate.author);
        if title.is_empty() && author.is_empty() {
            return Ok(DuplicateMatch::none());
        }

        let options = QueryOptions::default()
            .with_order("addedAt", OrderDirection::Descending)
            .with_limit(SCAN_CAP);
        let recent = self.books.base().get_with_options(user, &options).await?;

        for book in recent {
            if normalize_text(&book.title) == title && normalize_text(&book.author) == author {
                debug!(user = %user, matched = %book.id, "duplicate by normalized identity");
                return Ok(DuplicateMatch::found(MatchKind::NormalizedIdentity, book));
            }
        }

        Ok(DuplicateMatch::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use bridge_memory::MemoryRemoteStore;
    use bridge_traits::time::SystemClock;
    use core_runtime::events::EventBus;
    use std::sync::Arc;

    fn detector() -> (DuplicateDetector, BookRepository, UserId) {
        let books = BookRepository::new(
            Arc::new(MemoryRemoteStore::new()),
            EventBus::new(),
            Arc::new(SystemClock),
        );
        (DuplicateDetector::new(books.clone()), books, UserId::new("u1"))
    }

    fn candidate(isbn: Option<&str>, title: &str, author: &str) -> DuplicateCandidate {
        DuplicateCandidate {
            isbn: isbn.map(str::to_string),
            title: title.to_string(),
            author: author.to_string(),
        }
    }

    #[tokio::test]
    async fn isbn_hit_short_circuits_regardless_of_text() {
        let (detector, books, user) = detector();
        books
            .base()
            .add(
                &user,
                &NewBook {
                    isbn: Some("9780261103344".to_string()),
                    title: "The Hobbit".to_string(),
                    author: "J.R.R. Tolkien".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = detector
            .check_for_duplicate(
                &user,
                &candidate(Some("9780261103344"), "Completely Different", "Nobody"),
            )
            .await
            .unwrap();

        assert!(result.is_duplicate);
        assert_eq!(result.match_kind, Some(MatchKind::NaturalKey));
        assert_eq!(result.matched.unwrap().title, "The Hobbit");
    }

    #[tokio::test]
    async fn normalized_identity_matches_messy_text() {
        let (detector, books, user) = detector();
        books
            .base()
            .add(
                &user,
                &NewBook {
                    title: "the hobbit".to_string(),
                    author: "j r r tolkien".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = detector
            .check_for_duplicate(&user, &candidate(None, "The Hobbit ", "J.R.R. Tolkien"))
            .await
            .unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.match_kind, Some(MatchKind::NormalizedIdentity));

        let miss = detector
            .check_for_duplicate(&user, &candidate(None, "The Silmarillion", "J.R.R. Tolkien"))
            .await
            .unwrap();
        assert!(!miss.is_duplicate);
        assert_eq!(miss.match_kind, None);
    }

    #[tokio::test]
    async fn isbn_miss_falls_through_to_text_scan() {
        let (detector, books, user) = detector();
        books
            .base()
            .add(
                &user,
                &NewBook {
                    title: "Dune".to_string(),
                    author: "Frank Herbert".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = detector
            .check_for_duplicate(&user, &candidate(Some("0000000000"), "DUNE", "frank herbert"))
            .await
            .unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.match_kind, Some(MatchKind::NormalizedIdentity));
    }

    #[tokio::test]
    async fn empty_candidate_is_never_a_duplicate() {
        let (detector, _books, user) = detector();
        let result = detector
            .check_for_duplicate(&user, &candidate(None, "", ""))
            .await
            .unwrap();
        assert!(!result.is_duplicate);
    }
}
