//! Genre repository: grouping CRUD under the `series:*` event vocabulary,
//! name lookup, and the clamped book counter.

use crate::error::{LibraryError, Result};
use crate::models::{Genre, NewGenre};
use crate::repository::CachedRepository;
use bridge_traits::store::{Document, FieldFilter, QueryOptions, RemoteStore, UserId};
use core_runtime::events::{topics, EventBus};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Domain queries over the `genres` collection.
#[derive(Clone)]
pub struct GenreRepository {
    base: CachedRepository<Genre>,
}

impl GenreRepository {
    pub fn new(store: Arc<dyn RemoteStore>, bus: EventBus) -> Self {
        Self {
            base: CachedRepository::new(store, bus),
        }
    }

    /// Generic cache/CRUD operations.
    pub fn base(&self) -> &CachedRepository<Genre> {
        &self.base
    }

    /// Create a genre, announced as `series:created` rather than the
    /// generic `entity:saved`. The name is the natural key and must be
    /// non-blank.
    #[instrument(skip(self, new))]
    pub async fn create(&self, user: &UserId, new: &NewGenre) -> Result<Genre> {
        if new.name.trim().is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "name".to_string(),
                message: "genre name must not be blank".to_string(),
            });
        }
        self.base.add_emitting(user, new, topics::SERIES_CREATED).await
    }

    /// Patch a genre's fields, announced as `series:updated`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, user: &UserId, id: &str, patch: Document) -> Result<()> {
        self.base.apply_patch(user, id, patch, topics::SERIES_UPDATED).await
    }

    /// Hard-delete a genre, announced as `series:deleted`.
    #[instrument(skip(self))]
    pub async fn delete(&self, user: &UserId, id: &str) -> Result<()> {
        self.base.remove_emitting(user, id, topics::SERIES_DELETED).await
    }

    /// Natural-key lookup by exact genre name.
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, user: &UserId, name: &str) -> Result<Option<Genre>> {
        let options = QueryOptions::filtered(FieldFilter::equals("name", name)).with_limit(1);
        let mut genres = self.base.get_with_options(user, &options).await?;
        Ok(genres.pop())
    }

    /// Adjust `bookCount` by `delta`, clamped at zero.
    ///
    /// Read-modify-write without a transaction: concurrent increments can
    /// lose updates. Callers must tolerate that; the counter is advisory.
    #[instrument(skip(self))]
    pub async fn adjust_book_count(&self, user: &UserId, id: &str, delta: i64) -> Result<u32> {
        let genre = self
            .base
            .get_by_id(user, id)
            .await?
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: "genre".to_string(),
                id: id.to_string(),
            })?;

        let new_count = (i64::from(genre.book_count) + delta).max(0) as u32;
        let mut patch = Document::new();
        patch.insert("bookCount".to_string(), Value::from(new_count));
        self.base.update(user, id, patch).await?;
        Ok(new_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewGenre;
    use bridge_memory::MemoryRemoteStore;

    fn repo() -> GenreRepository {
        GenreRepository::new(Arc::new(MemoryRemoteStore::new()), EventBus::new())
    }

    #[tokio::test]
    async fn crud_emits_grouping_topics() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let bus = EventBus::new();
        let repo = GenreRepository::new(Arc::new(MemoryRemoteStore::new()), bus.clone());
        let user = UserId::new("u1");

        let created = Arc::new(AtomicUsize::new(0));
        let updated = Arc::new(AtomicUsize::new(0));
        let deleted = Arc::new(AtomicUsize::new(0));
        {
            let created = Arc::clone(&created);
            bus.on(topics::SERIES_CREATED, move |payload| {
                assert_eq!(payload["collection"], "genres");
                assert_eq!(payload["userId"], "u1");
                assert!(payload["id"].is_string());
                created.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        {
            let updated = Arc::clone(&updated);
            bus.on(topics::SERIES_UPDATED, move |_| {
                updated.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        {
            let deleted = Arc::clone(&deleted);
            bus.on(topics::SERIES_DELETED, move |_| {
                deleted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let genre = repo
            .create(
                &user,
                &NewGenre {
                    name: "Horror".to_string(),
                    book_count: 0,
                },
            )
            .await
            .unwrap();

        let mut patch = Document::new();
        patch.insert("name".to_string(), Value::from("Gothic Horror"));
        repo.update(&user, &genre.id, patch).await.unwrap();
        repo.delete(&user, &genre.id).await.unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(updated.load(Ordering::SeqCst), 1);
        assert_eq!(deleted.load(Ordering::SeqCst), 1);
        assert!(repo.find_by_name(&user, "Gothic Horror").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let repo = repo();
        let user = UserId::new("u1");
        let err = repo
            .create(
                &user,
                &NewGenre {
                    name: "   ".to_string(),
                    book_count: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn find_by_name_is_exact() {
        let repo = repo();
        let user = UserId::new("u1");
        repo.base()
            .add(
                &user,
                &NewGenre {
                    name: "Science Fiction".to_string(),
                    book_count: 0,
                },
            )
            .await
            .unwrap();

        let found = repo.find_by_name(&user, "Science Fiction").await.unwrap();
        assert!(found.is_some());
        assert!(repo.find_by_name(&user, "science fiction").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn book_count_clamps_at_zero() {
        let repo = repo();
        let user = UserId::new("u1");
        let genre = repo
            .base()
            .add(
                &user,
                &NewGenre {
                    name: "Fantasy".to_string(),
                    book_count: 1,
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.adjust_book_count(&user, &genre.id, 2).await.unwrap(), 3);
        assert_eq!(repo.adjust_book_count(&user, &genre.id, -5).await.unwrap(), 0);

        let reloaded = repo.base().get_by_id(&user, &genre.id).await.unwrap().unwrap();
        assert_eq!(reloaded.book_count, 0);
    }

    #[tokio::test]
    async fn adjusting_missing_genre_is_not_found() {
        let repo = repo();
        let user = UserId::new("u1");
        let err = repo.adjust_book_count(&user, "nope", 1).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { .. }));
    }
}
