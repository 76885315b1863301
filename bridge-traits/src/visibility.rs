//! Page/Tab Visibility Signal
//!
//! Notifies the core when the hosting page or window is hidden or shown, so
//! refresh scheduling can react to the user leaving and returning.
//!
//! # Platform Support
//!
//! - **Web**: Page Visibility API (`document.hidden` + `visibilitychange`)
//! - **Desktop**: window focus/minimize events
//! - **iOS/Android**: app foreground/background lifecycle callbacks
//!
//! Consumers must treat the signal as level-triggered: re-read
//! [`VisibilitySource::is_hidden`] on each notification rather than trusting
//! event edge semantics, since hosts may coalesce or replay change events.

use tokio::sync::watch;

/// Host-delivered visibility signal.
///
/// `changes()` yields a fresh [`watch::Receiver`]; the boolean it carries is
/// advisory only (the current hidden flag at send time). Each notification
/// should be followed by an `is_hidden()` read.
pub trait VisibilitySource: Send + Sync {
    /// Whether the page/tab is currently hidden.
    fn is_hidden(&self) -> bool;

    /// Subscribe to visibility change notifications.
    fn changes(&self) -> watch::Receiver<bool>;
}
