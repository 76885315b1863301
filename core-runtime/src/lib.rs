//! # Core Runtime
//!
//! Shared runtime infrastructure for the library client:
//!
//! - [`events`]: in-process event bus with synchronous snapshot dispatch
//! - [`logging`]: `tracing`-based structured logging setup
//! - [`error`]: runtime error types

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{topics, EventBus, EventPayload, ListenerId, Subscription};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
