//! Generic cache-plus-query repository over one remote collection.
//!
//! One `CachedRepository<T>` fronts one store collection. It owns a per-user
//! whole-collection cache and coalesces concurrent fetches: while a fetch is
//! in flight for a `(user, collection)` key, later callers attach to the same
//! pending result instead of issuing a second remote read.
//!
//! Invalidation policy: every mutation (`add`/`update`/`remove`)
//! unconditionally drops the whole-collection cache for that user. No
//! partial patching of cached entries.

use crate::error::{LibraryError, Result};
use crate::models::{from_document, to_document, Entity};
use bridge_traits::store::{Document, QueryOptions, RemoteStore, UserId};
use core_runtime::events::{topics, EventBus};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

type FetchOutcome<T> = Result<Arc<Vec<T>>>;
type SharedFetch<T> = Shared<BoxFuture<'static, FetchOutcome<T>>>;

struct RepoState<T> {
    cache: HashMap<UserId, Arc<Vec<T>>>,
    /// At most one outstanding fetch per user. The id distinguishes this
    /// fetch from a successor started after a `clear_cache` or a mutation.
    in_flight: HashMap<UserId, (u64, SharedFetch<T>)>,
    next_fetch_id: u64,
}

impl<T> Default for RepoState<T> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            in_flight: HashMap::new(),
            next_fetch_id: 0,
        }
    }
}

/// Cache-and-query façade over one [`RemoteStore`] collection, scoped by a
/// [`UserId`] supplied on every call.
pub struct CachedRepository<T: Entity> {
    store: Arc<dyn RemoteStore>,
    bus: EventBus,
    state: Arc<Mutex<RepoState<T>>>,
}

impl<T: Entity> Clone for CachedRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bus: self.bus.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Entity> CachedRepository<T> {
    pub fn new(store: Arc<dyn RemoteStore>, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            state: Arc::new(Mutex::new(RepoState::default())),
        }
    }

    pub fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    /// Return the user's collection, from cache when populated.
    ///
    /// With `force_refresh`, or on a cache miss, performs a coalesced fetch:
    /// concurrent callers share one remote read and receive the same settled
    /// result. On success the cache is replaced atomically; on failure the
    /// prior cache (if any) is left intact so callers may fall back to it.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn get_all(&self, user: &UserId, force_refresh: bool) -> Result<Arc<Vec<T>>> {
        if !force_refresh {
            if let Some(cached) = self.lock().cache.get(user).cloned() {
                debug!(user = %user, "serving from cache");
                return Ok(cached);
            }
        }

        let fetch = {
            let mut state = self.lock();
            match state.in_flight.get(user) {
                Some((_, existing)) => {
                    debug!(user = %user, "attaching to in-flight fetch");
                    existing.clone()
                }
                None => {
                    state.next_fetch_id += 1;
                    let fetch_id = state.next_fetch_id;
                    let fetch = self.start_fetch(user.clone(), fetch_id);
                    state.in_flight.insert(user.clone(), (fetch_id, fetch.clone()));
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Build the shared fetch future. Bookkeeping (marker removal, cache
    /// install, refresh event) runs inside it, so it happens exactly once no
    /// matter how many callers attach.
    fn start_fetch(&self, user: UserId, fetch_id: u64) -> SharedFetch<T> {
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let bus = self.bus.clone();

        async move {
            let outcome = store
                .query(T::COLLECTION, &user, &QueryOptions::default())
                .await
                .map_err(LibraryError::from)
                .and_then(|docs| {
                    docs.into_iter()
                        .map(from_document::<T>)
                        .collect::<Result<Vec<T>>>()
                })
                .map(Arc::new);

            let installed = {
                let mut state = state.lock().expect("repository state poisoned");
                // A clear_cache (or a successor fetch) may have dropped our
                // marker while we were in flight; if so, this result must
                // not repopulate the cache.
                let current = matches!(state.in_flight.get(&user), Some((id, _)) if *id == fetch_id);
                if current {
                    state.in_flight.remove(&user);
                    if let Ok(items) = &outcome {
                        state.cache.insert(user.clone(), Arc::clone(items));
                    }
                }
                current && outcome.is_ok()
            };

            match &outcome {
                Ok(items) => {
                    debug!(user = %user, count = items.len(), collection = T::COLLECTION, "fetched collection");
                    if installed {
                        bus.emit(
                            topics::COLLECTION_REFRESHED,
                            json!({ "collection": T::COLLECTION, "userId": user.as_str() }),
                        );
                    }
                }
                Err(error) => {
                    warn!(user = %user, collection = T::COLLECTION, %error, "collection fetch failed");
                }
            }

            outcome
        }
        .boxed()
        .shared()
    }

    /// Point lookup. Served by scanning the populated cache; on a cache miss
    /// issues a direct point fetch without populating the collection cache.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn get_by_id(&self, user: &UserId, id: &str) -> Result<Option<T>> {
        if let Some(cached) = self.lock().cache.get(user).cloned() {
            return Ok(cached.iter().find(|e| e.id() == id).cloned());
        }

        match self.store.get(T::COLLECTION, user, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Ordered/filtered/limited query, always issued fresh against the
    /// store. The whole-collection cache is neither consulted nor populated:
    /// it is not guaranteed consistent with an arbitrary order/limit
    /// combination.
    #[instrument(skip(self, options), fields(collection = T::COLLECTION))]
    pub async fn get_with_options(&self, user: &UserId, options: &QueryOptions) -> Result<Vec<T>> {
        let docs = self.store.query(T::COLLECTION, user, options).await?;
        docs.into_iter().map(from_document).collect()
    }

    /// Create an entity. The store assigns the id; the created entity is
    /// returned with it populated. Invalidates the user's cache and emits
    /// `entity:saved`.
    #[instrument(skip(self, new), fields(collection = T::COLLECTION))]
    pub async fn add<N: Serialize + Sync>(&self, user: &UserId, new: &N) -> Result<T> {
        self.add_emitting(user, new, topics::ENTITY_SAVED).await
    }

    /// Create with a caller-chosen event topic. Grouping repositories
    /// announce their entities under the `series:*` vocabulary instead of
    /// the generic `entity:saved`.
    pub(crate) async fn add_emitting<N: Serialize + Sync>(
        &self,
        user: &UserId,
        new: &N,
        topic: &str,
    ) -> Result<T> {
        let fields = to_document(new)?;
        let created = self.store.insert(T::COLLECTION, user, fields).await?;
        let entity: T = from_document(created)?;

        self.invalidate(user);
        self.emit_entity(topic, user, entity.id());
        Ok(entity)
    }

    /// Shallow-merge `patch` into the stored entity: a present field fully
    /// replaces the prior value, `null` clears it, absent fields are
    /// untouched. Invalidates the user's cache and emits `entity:saved`.
    #[instrument(skip(self, patch), fields(collection = T::COLLECTION))]
    pub async fn update(&self, user: &UserId, id: &str, patch: Document) -> Result<()> {
        self.apply_patch(user, id, patch, topics::ENTITY_SAVED).await
    }

    /// Patch with a caller-chosen event topic. Soft delete and restore are
    /// patches on `deletedAt` but announce themselves as deletion/restoration
    /// rather than a plain save.
    pub(crate) async fn apply_patch(
        &self,
        user: &UserId,
        id: &str,
        patch: Document,
        topic: &str,
    ) -> Result<()> {
        self.store.update(T::COLLECTION, user, id, patch).await?;
        self.invalidate(user);
        self.emit_entity(topic, user, id);
        Ok(())
    }

    /// Physically delete the entity. Invalidates the user's cache and emits
    /// `entity:deleted`. Soft deletion, where a domain wants it, goes
    /// through [`update`](Self::update) with a `deletedAt` patch instead.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn remove(&self, user: &UserId, id: &str) -> Result<()> {
        self.remove_emitting(user, id, topics::ENTITY_DELETED).await
    }

    /// Delete with a caller-chosen event topic.
    pub(crate) async fn remove_emitting(&self, user: &UserId, id: &str, topic: &str) -> Result<()> {
        self.store.delete(T::COLLECTION, user, id).await?;
        self.invalidate(user);
        self.emit_entity(topic, user, id);
        Ok(())
    }

    /// Entity count: cache length when populated, otherwise a lightweight
    /// store count query.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn get_count(&self, user: &UserId) -> Result<u64> {
        if let Some(cached) = self.lock().cache.get(user) {
            return Ok(cached.len() as u64);
        }
        Ok(self.store.count(T::COLLECTION, user).await?)
    }

    /// Drop the user's cache entry and in-flight marker. The next `get_all`
    /// is guaranteed to issue a remote fetch.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub fn clear_cache(&self, user: &UserId) {
        let mut state = self.lock();
        state.cache.remove(user);
        state.in_flight.remove(user);
        debug!(user = %user, collection = T::COLLECTION, "cache cleared");
    }

    fn invalidate(&self, user: &UserId) {
        let mut state = self.lock();
        state.cache.remove(user);
        // A fetch that snapshotted the collection before this mutation must
        // not install its result. Dropping the marker retires its fetch id,
        // so the settled future skips the cache install.
        state.in_flight.remove(user);
    }

    fn emit_entity(&self, topic: &str, user: &UserId, id: &str) {
        self.bus.emit(
            topic,
            json!({ "collection": T::COLLECTION, "id": id, "userId": user.as_str() }),
        );
    }

    fn lock(&self) -> MutexGuard<'_, RepoState<T>> {
        // Never held across an await.
        self.state.lock().expect("repository state poisoned")
    }
}
