//! # Core Refresh
//!
//! Visibility-driven refresh scheduling: the persisted auto-refresh policy
//! and the coordinator that fires a caller-supplied refresh action when the
//! page comes back after being hidden long enough.

pub mod coordinator;
pub mod error;
pub mod policy;

pub use coordinator::{register, CoordinatorHandle, RefreshCallback};
pub use error::{RefreshError, Result};
pub use policy::{RefreshPolicy, RefreshPolicyStore, POLICY_KEY};
