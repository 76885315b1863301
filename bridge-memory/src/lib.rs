//! # In-Memory Bridge Implementations
//!
//! Concrete implementations of the `bridge-traits` contracts backed by plain
//! in-process data structures. These serve two roles:
//!
//! - shared test doubles across the workspace (failure injection, query
//!   counters, manual visibility control)
//! - a local/offline backend for development builds that have no remote
//!   store configured
//!
//! Production hosts supply their own adapters (a cloud document store,
//! platform preference storage, the browser visibility API).

pub mod settings;
pub mod store;
pub mod visibility;

pub use settings::MemorySettingsStore;
pub use store::MemoryRemoteStore;
pub use visibility::HostVisibility;
