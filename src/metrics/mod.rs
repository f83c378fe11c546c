//! Built-in metrics for reload cycles.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Reload attempts, commits, skips and failures
//! - Reload duration
//! - Listener refusals
//! - Number of live properties
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_props::prelude::*;
//! use opentelemetry::global;
//!
//! # fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let reloader = Reloader::builder()
//!     .with_file("app.properties")
//!     .with_metrics(meter)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod config_metrics;

pub use config_metrics::ConfigMetrics;
