//! Modification-marker based change detection.

use crate::sources::PropertySource;
use std::sync::Arc;
use std::time::SystemTime;

/// A comparable modification marker, usually a file's modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(SystemTime);

impl Marker {
    /// Wrap a timestamp.
    pub fn new(time: SystemTime) -> Self {
        Self(time)
    }

    /// The wrapped timestamp.
    pub fn time(&self) -> SystemTime {
        self.0
    }
}

impl From<SystemTime> for Marker {
    fn from(time: SystemTime) -> Self {
        Self(time)
    }
}

/// One watched source in precedence order.
pub struct SourceDescriptor {
    source: Arc<dyn PropertySource>,
    ignore_not_found: bool,
    last_seen: Option<Marker>,
    rank: usize,
}

impl SourceDescriptor {
    /// Describe a source at the given precedence rank.
    pub fn new(source: Arc<dyn PropertySource>, rank: usize, ignore_not_found: bool) -> Self {
        Self {
            source,
            ignore_not_found,
            last_seen: None,
            rank,
        }
    }

    /// The source itself.
    pub fn source(&self) -> &Arc<dyn PropertySource> {
        &self.source
    }

    /// Whether a missing resource is skipped instead of failing the reload.
    pub fn ignore_not_found(&self) -> bool {
        self.ignore_not_found
    }

    /// The marker recorded at the last committed reload.
    pub fn last_seen(&self) -> Option<Marker> {
        self.last_seen
    }

    /// Position in the source list; higher ranks override lower ones.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// Outcome of a change check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    /// Whether a reload is needed.
    pub changed: bool,
    /// Freshly observed marker per source, in source order.
    pub observed: Vec<Option<Marker>>,
    /// Sources whose marker could not be read.
    pub warnings: Vec<String>,
}

/// Detects whether any source changed since the last committed reload.
///
/// A source changed when its current marker is strictly greater than the
/// recorded one. Sources whose marker cannot be read count as unchanged
/// and are reported as warnings. Until the first reload has committed,
/// every check reports a change.
#[derive(Debug, Default)]
pub struct SourceWatcher {
    primed: bool,
}

impl SourceWatcher {
    /// Create a watcher that has never seen a committed reload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reload has committed since creation.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Observe every source's marker and decide whether a reload is needed.
    pub fn check(&self, sources: &[SourceDescriptor]) -> ChangeReport {
        let mut report = ChangeReport {
            changed: !self.primed,
            observed: Vec::with_capacity(sources.len()),
            warnings: Vec::new(),
        };

        for descriptor in sources {
            let observed = match descriptor.source.marker() {
                Ok(marker) => marker,
                Err(e) => {
                    let warning = format!(
                        "can't determine modification marker of '{}': {}",
                        descriptor.source.name(),
                        e
                    );
                    tracing::warn!(source = %descriptor.source.name(), error = %e, "Treating source as unchanged");
                    report.warnings.push(warning);
                    None
                }
            };

            if let Some(marker) = observed {
                if descriptor.last_seen.is_none_or(|seen| marker > seen) {
                    tracing::debug!(source = %descriptor.source.name(), "Source changed");
                    report.changed = true;
                }
            }
            report.observed.push(observed);
        }

        report
    }

    /// Record the marker seen for a source at a committed reload.
    pub fn mark_seen(&self, descriptor: &mut SourceDescriptor, marker: Marker) {
        descriptor.last_seen = Some(marker);
    }

    /// Note that a reload cycle committed.
    pub fn prime(&mut self) {
        self.primed = true;
    }
}
