//! Reload triggers: filesystem events and a fixed interval.

use crate::core::Reloader;
use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, timeout};

/// Default quiet period before a burst of file events triggers a reload.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Runs `reload(false)` whenever one of the reloader's files changes.
///
/// Watches the directory of every file-backed source (so editors that
/// replace files on save are still noticed), collapses bursts of events
/// until the debounce period passes quietly, then reloads on a blocking
/// task. A failed reload is logged and the current properties stay live.
///
/// Dropping the trigger stops watching.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::notify::FileTrigger;
/// use hotswap_props::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let reloader = Arc::new(Reloader::builder().with_file("app.properties").build()?);
/// let _trigger = FileTrigger::spawn(Arc::clone(&reloader), Duration::from_millis(200))?;
/// # Ok(())
/// # }
/// ```
pub struct FileTrigger {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    debounce: Duration,
    targets: Vec<PathBuf>,
}

impl FileTrigger {
    /// Start watching every file source of `reloader`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WatchError` if a source's directory cannot be
    /// resolved or watched.
    pub fn spawn(reloader: Arc<Reloader>, debounce: Duration) -> Result<Self> {
        let mut targets = Vec::new();
        let mut directories = BTreeSet::new();
        for path in reloader.watched_paths() {
            let (directory, target) = resolve_target(&path)?;
            directories.insert(directory);
            targets.push(target);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel::<()>();
        let interesting = targets.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                    && event.paths.iter().any(|p| interesting.contains(p))
                {
                    let _ = event_tx.send(());
                }
            }
            Err(e) => tracing::warn!(error = %e, "File watch error"),
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        for directory in &directories {
            watcher
                .watch(directory, RecursiveMode::NonRecursive)
                .map_err(|e| {
                    ConfigError::WatchError(format!("Failed to watch {}: {}", directory.display(), e))
                })?;
        }
        tracing::info!(files = targets.len(), "Watching property files for changes");

        let task = tokio::spawn(debounce_and_reload(reloader, event_rx, debounce));

        Ok(Self {
            _watcher: watcher,
            task,
            debounce,
            targets,
        })
    }

    /// Get the debounce duration for this trigger.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce
    }

    /// Files whose changes trigger a reload.
    pub fn watched_files(&self) -> &[PathBuf] {
        &self.targets
    }

    /// Stop watching and wait for an in-flight reload to finish.
    pub async fn stop(self) {
        let Self { _watcher, task, .. } = self;
        drop(_watcher);
        let _ = task.await;
    }
}

/// Split a file path into its canonical directory and the canonical target path.
fn resolve_target(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::WatchError(format!("Not a file path: {}", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = directory.canonicalize().map_err(|e| {
        ConfigError::WatchError(format!("Failed to resolve {}: {}", directory.display(), e))
    })?;
    let target = directory.join(file_name);
    Ok((directory, target))
}

async fn debounce_and_reload(
    reloader: Arc<Reloader>,
    mut events: mpsc::UnboundedReceiver<()>,
    debounce: Duration,
) {
    while events.recv().await.is_some() {
        // Wait for the burst to settle
        loop {
            match timeout(debounce, events.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) | Err(_) => break,
            }
        }
        run_reload(&reloader, "file change").await;
    }
    tracing::debug!("File trigger stopped");
}

/// Run `reload(false)` off the async executor and log the outcome.
async fn run_reload(reloader: &Arc<Reloader>, trigger: &'static str) {
    let reloader = Arc::clone(reloader);
    match tokio::task::spawn_blocking(move || reloader.reload(false)).await {
        Ok(Ok(true)) => tracing::info!(trigger, "Properties reloaded"),
        Ok(Ok(false)) => tracing::debug!(trigger, "Properties unchanged"),
        Ok(Err(e)) => tracing::error!(trigger, error = %e, "Reload failed; keeping current properties"),
        Err(e) => tracing::error!(trigger, error = %e, "Reload task panicked"),
    }
}

/// Call `reload(false)` every `period` until the handle is aborted.
///
/// The first check happens one period after the call. Must be called from
/// within a tokio runtime.
pub fn spawn_interval_reload(reloader: Arc<Reloader>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            run_reload(&reloader, "interval").await;
        }
    })
}
