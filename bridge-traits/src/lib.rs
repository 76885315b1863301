//! # Host Bridge Traits
//!
//! Abstractions over the external collaborators the sync layer consumes.
//!
//! ## Overview
//!
//! This crate defines the contract between the library-tracking core and the
//! host environment. Each trait represents a capability implemented outside
//! this workspace (remote document store, preference storage, page visibility
//! signal, time source).
//!
//! ## Traits
//!
//! ### Data
//! - [`RemoteStore`](store::RemoteStore) - Per-user, per-collection document CRUD and queries
//! - [`SettingsStore`](settings::SettingsStore) - Key-value preferences storage
//!
//! ### Platform Integration
//! - [`VisibilitySource`](visibility::VisibilitySource) - Page/tab visibility signal
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! Remote store operations fail with [`StoreError`](error::StoreError): one
//! undifferentiated "remote operation failed" condition; this layer assumes
//! no finer taxonomy from the store. Other bridge capabilities use
//! [`BridgeError`](error::BridgeError).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod settings;
pub mod store;
pub mod time;
pub mod visibility;

pub use error::{BridgeError, StoreError};

// Re-export commonly used types
pub use settings::SettingsStore;
pub use store::{Document, FieldFilter, OrderDirection, QueryOptions, RemoteStore, UserId};
pub use time::{Clock, SystemClock};
pub use visibility::VisibilitySource;
