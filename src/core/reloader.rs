//! Reload orchestration: check, load, merge, commit.

use crate::core::{Mapping, Marker, PropertyStore, ReloaderBuilder, SourceDescriptor, SourceWatcher};
use crate::error::{ConfigError, Result};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::ConfigMetrics;

/// Per-cycle state, only touched while holding the reload guard.
struct ReloadState {
    sources: Vec<SourceDescriptor>,
    watcher: SourceWatcher,
}

/// Re-reads property sources and publishes the merged result.
///
/// A reload cycle checks the sources' modification markers, loads every
/// source in precedence order (later sources override earlier ones), and
/// hands the merged mapping to the store. A failure before publication
/// leaves both the store and the recorded markers exactly as they were, so
/// the call can simply be retried. A listener failing after publication is
/// reported once; the published mapping is not pushed again.
///
/// Cycles are serialized: a second caller of [`reload`](Self::reload) blocks
/// until the in-flight cycle finishes, while [`try_reload`](Self::try_reload)
/// returns immediately instead.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
///
/// # fn example() -> Result<()> {
/// let reloader = Reloader::builder()
///     .with_file("config/defaults.properties")
///     .with_optional_file("config/local.properties")
///     .build()?;
///
/// // Later, from a timer or an admin endpoint
/// if reloader.reload(false)? {
///     println!("now {} properties", reloader.store().read().len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Reloader {
    store: Arc<PropertyStore>,
    state: Mutex<ReloadState>,
    #[cfg(feature = "metrics")]
    metrics: Option<ConfigMetrics>,
}

impl Reloader {
    /// Create a new builder.
    pub fn builder() -> ReloaderBuilder {
        ReloaderBuilder::new()
    }

    /// Create a reloader over sources already in precedence order.
    ///
    /// No reload is performed; call `reload(true)` to populate the store.
    pub fn new(store: Arc<PropertyStore>, sources: Vec<SourceDescriptor>) -> Self {
        Self {
            store,
            state: Mutex::new(ReloadState {
                sources,
                watcher: SourceWatcher::new(),
            }),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attach a metrics collector.
    #[cfg(feature = "metrics")]
    pub(crate) fn with_metrics(mut self, metrics: ConfigMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The store this reloader publishes to.
    pub fn store(&self) -> &Arc<PropertyStore> {
        &self.store
    }

    /// Shortcut for `store().read()`.
    pub fn read(&self) -> Arc<Mapping> {
        self.store.read()
    }

    /// Source names in precedence order (lowest first).
    pub fn source_names(&self) -> Vec<String> {
        self.state
            .lock()
            .sources
            .iter()
            .map(|descriptor| descriptor.source().name())
            .collect()
    }

    /// Filesystem paths of all file-backed sources.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .sources
            .iter()
            .filter_map(|descriptor| descriptor.source().path().map(PathBuf::from))
            .collect()
    }

    /// Reload if any source changed, or unconditionally when `force` is set.
    ///
    /// Blocks while another reload is in flight. Returns whether a new
    /// mapping was published.
    ///
    /// # Errors
    ///
    /// - `SourceUnavailable` for a missing source that is not optional
    /// - `SourceRead` if a source could not be read or parsed
    /// - `ListenerPreFailure` if a listener refused the reload
    /// - `ListenerPostFailure` if a listener failed after publication (the
    ///   new mapping is live and its sources count as seen)
    pub fn reload(&self, force: bool) -> Result<bool> {
        let mut state = self.state.lock();
        self.run_cycle(&mut state, force)
    }

    /// Like [`reload`](Self::reload), but returns `Ok(None)` without waiting
    /// if another reload is in flight.
    pub fn try_reload(&self, force: bool) -> Result<Option<bool>> {
        match self.state.try_lock() {
            Some(mut state) => self.run_cycle(&mut state, force).map(Some),
            None => {
                tracing::debug!("Reload already in progress, skipping");
                Ok(None)
            }
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn run_cycle(&self, state: &mut ReloadState, force: bool) -> Result<bool> {
        self.cycle(state, force)
    }

    #[cfg(feature = "metrics")]
    fn run_cycle(&self, state: &mut ReloadState, force: bool) -> Result<bool> {
        let Some(metrics) = &self.metrics else {
            return self.cycle(state, force);
        };

        let timer = metrics.start_reload();
        let result = self.cycle(state, force);
        match &result {
            Ok(true) => {
                metrics.record_reload_success(timer);
                metrics.update_property_count(self.store.read().len());
            }
            Ok(false) => metrics.record_reload_skipped(),
            Err(e) => {
                if matches!(
                    e,
                    crate::error::ConfigError::ListenerPreFailure { .. }
                        | crate::error::ConfigError::ListenerPostFailure { .. }
                ) {
                    metrics.record_listener_failure();
                }
                metrics.record_reload_failure(timer);
            }
        }
        result
    }

    fn cycle(&self, state: &mut ReloadState, force: bool) -> Result<bool> {
        let report = state.watcher.check(&state.sources);
        if !force && !report.changed {
            tracing::trace!("Property sources unchanged");
            return Ok(false);
        }

        let merged = merge(&state.sources).inspect_err(|e| {
            tracing::error!(error = %e, "Reload aborted while loading sources; keeping current properties");
        })?;
        let properties = merged.len();

        match self.store.replace(merged) {
            Ok(()) => {}
            // Published: commit so the same content is not pushed again
            Err(e @ ConfigError::ListenerPostFailure { .. }) => {
                commit(state, report.observed);
                return Err(e);
            }
            Err(e) => return Err(e),
        }
        commit(state, report.observed);

        tracing::info!(forced = force, sources = state.sources.len(), properties, "Properties reloaded");
        Ok(true)
    }
}

/// Record the markers observed for a published cycle.
fn commit(state: &mut ReloadState, observed: Vec<Option<Marker>>) {
    let ReloadState { sources, watcher } = state;
    for (descriptor, observed) in sources.iter_mut().zip(observed) {
        if let Some(marker) = observed {
            watcher.mark_seen(descriptor, marker);
        }
    }
    watcher.prime();
}

/// Load every source in order, later sources overriding earlier ones.
fn merge(sources: &[SourceDescriptor]) -> Result<Mapping> {
    let mut merged = Mapping::new();

    for descriptor in sources {
        let source = descriptor.source();
        match source.load() {
            Ok(entries) => {
                tracing::debug!(source = %source.name(), rank = descriptor.rank(), properties = entries.len(), "Merging source");
                merged.overlay(entries);
            }
            Err(e) if e.is_not_found() && descriptor.ignore_not_found() => {
                tracing::warn!(source = %source.name(), error = %e, "Skipping missing optional source");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(merged)
}

impl std::fmt::Debug for Reloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reloader")
            .field("store", &self.store)
            .field("reloading", &self.state.is_locked())
            .finish_non_exhaustive()
    }
}
