//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (remote document
//! store, settings storage, visibility signal, clock) into the shared sync
//! core: one event bus, the per-collection repositories, the duplicate
//! detector, and the refresh policy store, with a helper for registering
//! visibility-driven cache refresh.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::store::{RemoteStore, UserId};
use bridge_traits::time::Clock;
use bridge_traits::visibility::VisibilitySource;
use bridge_traits::SettingsStore;
use core_library::{BookRepository, DuplicateDetector, GenreRepository, WishlistRepository};
use core_refresh::{CoordinatorHandle, RefreshPolicyStore};
use core_runtime::events::EventBus;
use futures::FutureExt;
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub store: Arc<dyn RemoteStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub visibility: Arc<dyn VisibilitySource>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        settings: Arc<dyn SettingsStore>,
        visibility: Arc<dyn VisibilitySource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            settings,
            visibility,
            clock,
        }
    }
}

/// Primary façade exposed to host applications.
///
/// Repositories share one [`EventBus`], so a mutation through any of them
/// notifies every subscriber, and one [`RefreshPolicyStore`] governs all
/// registered refresh coordinators.
#[derive(Clone)]
pub struct CoreService {
    bus: EventBus,
    books: BookRepository,
    genres: GenreRepository,
    wishlist: WishlistRepository,
    duplicates: DuplicateDetector,
    refresh_policy: RefreshPolicyStore,
    visibility: Arc<dyn VisibilitySource>,
    clock: Arc<dyn Clock>,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        let bus = EventBus::new();
        let books = BookRepository::new(
            Arc::clone(&deps.store),
            bus.clone(),
            Arc::clone(&deps.clock),
        );
        let genres = GenreRepository::new(Arc::clone(&deps.store), bus.clone());
        let wishlist = WishlistRepository::new(
            Arc::clone(&deps.store),
            bus.clone(),
            Arc::clone(&deps.clock),
        );
        let duplicates = DuplicateDetector::new(books.clone());
        let refresh_policy = RefreshPolicyStore::new(Arc::clone(&deps.settings));

        info!("core service initialized");
        Self {
            bus,
            books,
            genres,
            wishlist,
            duplicates,
            refresh_policy,
            visibility: deps.visibility,
            clock: deps.clock,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn books(&self) -> &BookRepository {
        &self.books
    }

    pub fn genres(&self) -> &GenreRepository {
        &self.genres
    }

    pub fn wishlist(&self) -> &WishlistRepository {
        &self.wishlist
    }

    pub fn duplicates(&self) -> &DuplicateDetector {
        &self.duplicates
    }

    pub fn refresh_policy(&self) -> &RefreshPolicyStore {
        &self.refresh_policy
    }

    /// Clear every repository cache for `user`, forcing the next reads to
    /// refetch.
    pub fn clear_caches(&self, user: &UserId) {
        self.books.base().clear_cache(user);
        self.genres.base().clear_cache(user);
        self.wishlist.base().clear_cache(user);
    }

    /// Register a visibility refresh coordinator whose refresh action clears
    /// the user's repository caches. Keep the handle alive for as long as
    /// refreshes should fire; dropping it deregisters.
    pub fn register_refresh_coordinator(&self, user: UserId) -> CoordinatorHandle {
        let service = self.clone();
        core_refresh::register(
            Arc::clone(&self.visibility),
            self.refresh_policy.clone(),
            Arc::clone(&self.clock),
            Arc::new(move || {
                let service = service.clone();
                let user = user.clone();
                async move {
                    service.clear_caches(&user);
                    Ok(())
                }
                .boxed()
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_memory::{HostVisibility, MemoryRemoteStore, MemorySettingsStore};
    use bridge_traits::time::SystemClock;
    use core_library::NewBook;
    use core_runtime::events::topics;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> CoreService {
        CoreService::new(CoreDependencies::new(
            Arc::new(MemoryRemoteStore::new()),
            Arc::new(MemorySettingsStore::new()),
            Arc::new(HostVisibility::new()),
            Arc::new(SystemClock),
        ))
    }

    #[tokio::test]
    async fn repositories_share_one_bus() {
        let service = service();
        let user = UserId::new("u1");
        let saved = Arc::new(AtomicUsize::new(0));
        {
            let saved = Arc::clone(&saved);
            service.events().on(topics::ENTITY_SAVED, move |_| {
                saved.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        service
            .books()
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

        assert_eq!(saved.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_detector_sees_repository_writes() {
        let service = service();
        let user = UserId::new("u1");
        service
            .books()
            .base()
            .add(
                &user,
                &NewBook {
                    title: "The Hobbit".to_string(),
                    author: "J.R.R. Tolkien".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = service
            .duplicates()
            .check_for_duplicate(
                &user,
                &core_library::DuplicateCandidate {
                    isbn: None,
                    title: "the hobbit".to_string(),
                    author: "J R R Tolkien".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(result.is_duplicate);
    }

    #[tokio::test]
    async fn clear_caches_forces_refetch() {
        let store = Arc::new(MemoryRemoteStore::new());
        let service = CoreService::new(CoreDependencies::new(
            store.clone(),
            Arc::new(MemorySettingsStore::new()),
            Arc::new(HostVisibility::new()),
            Arc::new(SystemClock),
        ));
        let user = UserId::new("u1");

        service.books().base().get_all(&user, false).await.unwrap();
        let before = store.query_count("books").await;
        service.clear_caches(&user);
        service.books().base().get_all(&user, false).await.unwrap();
        assert_eq!(store.query_count("books").await, before + 1);
    }
}
