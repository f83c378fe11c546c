//! # hotswap-props
//!
//! Hot-reloadable key/value properties with atomic swaps and change hooks.
//!
//! ## Overview
//!
//! `hotswap-props` keeps an application's flat string properties live:
//! - Lock-free reads of an immutable snapshot using `arc-swap`
//! - Ordered property sources where later sources override earlier ones
//! - Reloads that only happen when a source's modification marker advances
//! - All-or-nothing reloads: a failing source or listener leaves the old mapping live
//! - `${name=default}` placeholder resolution against the live properties
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_props::prelude::*;
//!
//! # fn example() -> hotswap_props::error::Result<()> {
//! let reloader = Reloader::builder()
//!     .with_file("config/defaults.properties")
//!     .with_optional_file("config/local.properties")
//!     .with_env_overrides("APP", "__")
//!     .build()?;
//!
//! // Zero-cost reads (no locks!)
//! let props = reloader.read();
//! println!("Server port: {:?}", props.get("server.port"));
//!
//! // Later, e.g. from a timer: reloads only if a file changed
//! let changed = reloader.reload(false)?;
//! # let _ = changed;
//!
//! let resolver = PlaceholderResolver::new();
//! let url = resolver.substitute_from(
//!     "jdbc://${db.host=localhost}:${db.port=5432}",
//!     &reloader.read(),
//!     UnresolvedPolicy::Keep,
//! )?;
//! # let _ = url;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): reload on file events or on a fixed interval
//! - `xml` (default): read `.xml` property lists
//! - `metrics`: OpenTelemetry reload metrics
//!
//! ```toml
//! [dependencies]
//! hotswap-props = { version = "0.1", features = ["metrics"] }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        Mapping, PlaceholderResolver, PropertyStore, Reloader, ReloaderBuilder, UnresolvedPolicy,
    };
    pub use crate::error::{BoxError, ConfigError, Result};
    pub use crate::notify::{FnListener, ReloadListener};
    pub use crate::sources::{FileSource, MemorySource, PropertySource};

    #[cfg(feature = "file-watch")]
    pub use crate::notify::{FileTrigger, spawn_interval_reload};
}
