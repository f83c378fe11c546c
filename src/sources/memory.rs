//! In-memory property source.

use super::PropertySource;
use crate::core::Marker;
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::SystemTime;

#[derive(Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    marker: Option<Marker>,
}

/// A property source backed by a map held in memory.
///
/// Useful for embedding defaults and for tests. The marker is whatever was
/// last set; `touch` stamps the current time.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::sources::{MemorySource, PropertySource};
///
/// let source = MemorySource::new("defaults").with_property("pool.size", "8");
/// source.set("pool.size", "16");
/// source.touch();
/// assert_eq!(source.load().unwrap()["pool.size"], "16");
/// ```
pub struct MemorySource {
    name: String,
    state: RwLock<MemoryState>,
}

impl MemorySource {
    /// Create an empty source without a marker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Add a property.
    pub fn with_property(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the initial marker.
    pub fn with_marker(self, marker: Marker) -> Self {
        self.set_marker(marker);
        self
    }

    /// Set or overwrite a property.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.write().entries.insert(key.into(), value.into());
    }

    /// Remove a property.
    pub fn remove(&self, key: &str) {
        self.state.write().entries.remove(key);
    }

    /// Replace every property at once.
    pub fn replace_all(&self, entries: HashMap<String, String>) {
        self.state.write().entries = entries;
    }

    /// Set the marker reported to the watcher.
    pub fn set_marker(&self, marker: Marker) {
        self.state.write().marker = Some(marker);
    }

    /// Stamp the marker with the current time.
    pub fn touch(&self) {
        self.set_marker(Marker::from(SystemTime::now()));
    }
}

impl PropertySource for MemorySource {
    fn name(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.state.read().entries.clone())
    }

    fn marker(&self) -> std::io::Result<Option<Marker>> {
        Ok(self.state.read().marker)
    }
}
