//! Reload notification and triggering.
//!
//! Listeners hear about every swap of the live properties; triggers decide
//! when a reload is attempted.

pub mod listener;

#[cfg(feature = "file-watch")]
pub mod trigger;

pub use listener::{FnListener, ListenerRegistry, ReloadListener};

#[cfg(feature = "file-watch")]
pub use trigger::{DEFAULT_DEBOUNCE, FileTrigger, spawn_interval_reload};
