//! Wishlist repository: ISBN lookup, soft-delete partitioning, and
//! purchase promotion.

use crate::error::Result;
use crate::models::{SoftDeletable, WishlistItem};
use crate::repository::CachedRepository;
use bridge_traits::store::{Document, FieldFilter, QueryOptions, RemoteStore, UserId};
use bridge_traits::time::Clock;
use core_runtime::events::{topics, EventBus};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Domain queries over the `wishlist` collection.
#[derive(Clone)]
pub struct WishlistRepository {
    base: CachedRepository<WishlistItem>,
    clock: Arc<dyn Clock>,
}

impl WishlistRepository {
    pub fn new(store: Arc<dyn RemoteStore>, bus: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            base: CachedRepository::new(store, bus),
            clock,
        }
    }

    /// Generic cache/CRUD operations.
    pub fn base(&self) -> &CachedRepository<WishlistItem> {
        &self.base
    }

    /// Indexed equality lookup by ISBN, limited to one result.
    #[instrument(skip(self))]
    pub async fn find_by_isbn(&self, user: &UserId, isbn: &str) -> Result<Option<WishlistItem>> {
        let options = QueryOptions::filtered(FieldFilter::equals("isbn", isbn)).with_limit(1);
        let mut items = self.base.get_with_options(user, &options).await?;
        Ok(items.pop())
    }

    /// Items without a `deletedAt` marker.
    pub async fn active(&self, user: &UserId) -> Result<Vec<WishlistItem>> {
        let all = self.base.get_all(user, false).await?;
        Ok(all.iter().filter(|i| !i.is_deleted()).cloned().collect())
    }

    /// Soft-deleted items, purchased ones included.
    pub async fn deleted(&self, user: &UserId) -> Result<Vec<WishlistItem>> {
        let all = self.base.get_all(user, false).await?;
        Ok(all.iter().filter(|i| i.is_deleted()).cloned().collect())
    }

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

    #[instrument(skip(self))]
    pub async fn restore(&self, user: &UserId, id: &str) -> Result<()> {
        let mut patch = Document::new();
        patch.insert("deletedAt".to_string(), Value::Null);
        self.base
            .apply_patch(user, id, patch, topics::ENTITY_RESTORED)
            .await
    }

    /// Mark an item bought: stamp `purchasedAt` and soft-delete it so it
    /// drops out of the active wishlist while staying in purchase history.
    #[instrument(skip(self))]
    pub async fn mark_purchased(&self, user: &UserId, id: &str) -> Result<()> {
        let now = self.clock.unix_timestamp_millis();
        let mut patch = Document::new();
        patch.insert("purchasedAt".to_string(), Value::from(now));
        patch.insert("deletedAt".to_string(), Value::from(now));
        self.base
            .apply_patch(user, id, patch, topics::ENTITY_DELETED)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewWishlistItem;
    use bridge_memory::MemoryRemoteStore;
    use bridge_traits::time::SystemClock;

    fn repo() -> WishlistRepository {
        WishlistRepository::new(
            Arc::new(MemoryRemoteStore::new()),
            EventBus::new(),
            Arc::new(SystemClock),
        )
    }

    fn item(title: &str) -> NewWishlistItem {
        NewWishlistItem {
            title: title.to_string(),
            author: "A".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn find_by_isbn_matches() {
        let repo = repo();
        let user = UserId::new("u1");
        repo.base()
            .add(
                &user,
                &NewWishlistItem {
                    isbn: Some("9780441013593".to_string()),
                    ..item("Dune")
                },
            )
            .await
            .unwrap();

        let found = repo.find_by_isbn(&user, "9780441013593").await.unwrap();
        assert_eq!(found.unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn mark_purchased_stamps_and_hides() {
        let repo = repo();
        let user = UserId::new("u1");
        let created = repo.base().add(&user, &item("Dune")).await.unwrap();
        repo.base().add(&user, &item("Emma")).await.unwrap();

        repo.mark_purchased(&user, &created.id).await.unwrap();

        let active = repo.active(&user).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Emma");

        let deleted = repo.deleted(&user).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(deleted[0].purchased_at.is_some());
        assert!(deleted[0].deleted_at.is_some());
    }

    #[tokio::test]
    async fn restore_brings_an_item_back() {
        let repo = repo();
        let user = UserId::new("u1");
        let created = repo.base().add(&user, &item("Dune")).await.unwrap();

        repo.soft_delete(&user, &created.id).await.unwrap();
        assert!(repo.active(&user).await.unwrap().is_empty());

        repo.restore(&user, &created.id).await.unwrap();
        assert_eq!(repo.active(&user).await.unwrap().len(), 1);
    }
}
