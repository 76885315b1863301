//! Book repository: natural-key lookups, soft-delete partitioning, and the
//! series position check.

use crate::error::Result;
use crate::models::{Book, SoftDeletable};
use crate::repository::CachedRepository;
use bridge_traits::store::{Document, FieldFilter, OrderDirection, QueryOptions, RemoteStore, UserId};
use bridge_traits::time::Clock;
use core_runtime::events::{topics, EventBus};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Domain queries over the `books` collection.
#[derive(Clone)]
pub struct BookRepository {
    base: CachedRepository<Book>,
    clock: Arc<dyn Clock>,
}

impl BookRepository {
    pub fn new(store: Arc<dyn RemoteStore>, bus: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            base: CachedRepository::new(store, bus),
            clock,
        }
    }

    /// Generic cache/CRUD operations (`get_all`, `add`, `update`, ...).
    pub fn base(&self) -> &CachedRepository<Book> {
        &self.base
    }

    /// Indexed equality lookup by ISBN, limited to one result. Tie-break
    /// among legacy duplicates is whatever the store returns first.
    #[instrument(skip(self))]
    pub async fn find_by_isbn(&self, user: &UserId, isbn: &str) -> Result<Option<Book>> {
        let options = QueryOptions::filtered(FieldFilter::equals("isbn", isbn)).with_limit(1);
        let mut books = self.base.get_with_options(user, &options).await?;
        Ok(books.pop())
    }

    /// All books in a series, ordered by their explicit position.
    #[instrument(skip(self))]
    pub async fn find_by_series(&self, user: &UserId, series_id: &str) -> Result<Vec<Book>> {
        let options = QueryOptions::filtered(FieldFilter::equals("seriesId", series_id))
            .with_order("seriesPosition", OrderDirection::Ascending);
        self.base.get_with_options(user, &options).await
    }

    /// Books tagged with a genre. `genreIds` is an array field, so this is
    /// a client-side membership filter over the cached collection rather
    /// than a store query.
    #[instrument(skip(self))]
    pub async fn find_by_genre(&self, user: &UserId, genre_id: &str) -> Result<Vec<Book>> {
        let all = self.base.get_all(user, false).await?;
        Ok(all
            .iter()
            .filter(|b| b.genre_ids.iter().any(|g| g == genre_id))
            .cloned()
            .collect())
    }

    /// Books without a `deletedAt` marker.
    pub async fn active(&self, user: &UserId) -> Result<Vec<Book>> {
        let all = self.base.get_all(user, false).await?;
        Ok(all.iter().filter(|b| !b.is_deleted()).cloned().collect())
    }

    /// Soft-deleted books.
    pub async fn deleted(&self, user: &UserId) -> Result<Vec<Book>> {
        let all = self.base.get_all(user, false).await?;
        Ok(all.iter().filter(|b| b.is_deleted()).cloned().collect())
    }

    /// Mark a book deleted by stamping `deletedAt`; the document stays in
    /// the store.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, user: &UserId, id: &str) -> Result<()> {
        let mut patch = Document::new();
        patch.insert(
            "deletedAt".to_string(),
            Value::from(self.clock.unix_timestamp_millis()),
        );
        self.base
            .apply_patch(user, id, patch, topics::ENTITY_DELETED)
            .await
    }

    /// Clear a book's `deletedAt` marker.
    #[instrument(skip(self))]
    pub async fn restore(&self, user: &UserId, id: &str) -> Result<()> {
        let mut patch = Document::new();
        patch.insert("deletedAt".to_string(), Value::Null);
        self.base
            .apply_patch(user, id, patch, topics::ENTITY_RESTORED)
            .await
    }

    /// Whether a non-deleted book other than `exclude_id` already occupies
    /// `position` in `series_id`.
    ///
    /// Check-then-write: callers run this before assigning a position, but
    /// the window between check and write is not atomic. Best-effort only.
    #[instrument(skip(self))]
    pub async fn series_position_taken(
        &self,
        user: &UserId,
        series_id: &str,
        position: u32,
        exclude_id: Option<&str>,
    ) -> Result<bool> {
        let options = QueryOptions::filtered(FieldFilter::equals("seriesId", series_id));
        let in_series = self.base.get_with_options(user, &options).await?;
        Ok(in_series.iter().any(|b| {
            b.series_position == Some(position)
                && !b.is_deleted()
                && exclude_id != Some(b.id.as_str())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use bridge_memory::MemoryRemoteStore;
    use bridge_traits::time::SystemClock;

    fn repo() -> BookRepository {
        BookRepository::new(
            Arc::new(MemoryRemoteStore::new()),
            EventBus::new(),
            Arc::new(SystemClock),
        )
    }

    fn book(title: &str, author: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn find_by_isbn_returns_the_match() {
        let repo = repo();
        let user = UserId::new("u1");
        repo.base()
            .add(
                &user,
                &NewBook {
                    isbn: Some("9780261103344".to_string()),
                    ..book("The Hobbit", "J.R.R. Tolkien")
                },
            )
            .await
            .unwrap();

        let found = repo.find_by_isbn(&user, "9780261103344").await.unwrap();
        assert_eq!(found.unwrap().title, "The Hobbit");
        assert!(repo.find_by_isbn(&user, "0000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_series_orders_by_position() {
        let repo = repo();
        let user = UserId::new("u1");
        for (title, pos) in [("Second", 2), ("First", 1), ("Third", 3)] {
            repo.base()
                .add(
                    &user,
                    &NewBook {
                        series_id: Some("s1".to_string()),
                        series_position: Some(pos),
                        ..book(title, "A")
                    },
                )
                .await
                .unwrap();
        }

        let in_series = repo.find_by_series(&user, "s1").await.unwrap();
        let titles: Vec<&str> = in_series.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn find_by_genre_filters_membership() {
        let repo = repo();
        let user = UserId::new("u1");
        repo.base()
            .add(
                &user,
                &NewBook {
                    genre_ids: vec!["g1".to_string(), "g2".to_string()],
                    ..book("Dune", "Frank Herbert")
                },
            )
            .await
            .unwrap();
        repo.base()
            .add(
                &user,
                &NewBook {
                    genre_ids: vec!["g2".to_string()],
                    ..book("Emma", "Jane Austen")
                },
            )
            .await
            .unwrap();

        let g1 = repo.find_by_genre(&user, "g1").await.unwrap();
        assert_eq!(g1.len(), 1);
        assert_eq!(g1[0].title, "Dune");
        assert_eq!(repo.find_by_genre(&user, "g2").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn soft_delete_partitions_and_restore_reverses() {
        let repo = repo();
        let user = UserId::new("u1");
        let created = repo.base().add(&user, &book("Dune", "Frank Herbert")).await.unwrap();
        repo.base().add(&user, &book("Emma", "Jane Austen")).await.unwrap();

        repo.soft_delete(&user, &created.id).await.unwrap();
        let active = repo.active(&user).await.unwrap();
        let deleted = repo.deleted(&user).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].title, "Dune");
        assert!(deleted[0].deleted_at.is_some());

        repo.restore(&user, &created.id).await.unwrap();
        assert_eq!(repo.active(&user).await.unwrap().len(), 2);
        assert!(repo.deleted(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn series_position_check_honors_exclusion_and_deletion() {
        let repo = repo();
        let user = UserId::new("u1");
        let holder = repo
            .base()
            .add(
                &user,
                &NewBook {
                    series_id: Some("s1".to_string()),
                    series_position: Some(1),
                    ..book("First", "A")
                },
            )
            .await
            .unwrap();

        assert!(repo.series_position_taken(&user, "s1", 1, None).await.unwrap());
        // Excluding the current holder frees the position for itself.
        assert!(!repo
            .series_position_taken(&user, "s1", 1, Some(&holder.id))
            .await
            .unwrap());
        assert!(!repo.series_position_taken(&user, "s1", 2, None).await.unwrap());

        // Soft-deleted holders no longer occupy their position.
        repo.soft_delete(&user, &holder.id).await.unwrap();
        assert!(!repo.series_position_taken(&user, "s1", 1, None).await.unwrap());
    }
}
