//! The live property store providing lock-free reads.

use crate::core::Mapping;
use crate::error::{BoxError, Result};
use crate::notify::{FnListener, ListenerRegistry, ReloadListener};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Holds the currently published property mapping.
///
/// Reads go through `arc-swap` and never wait for a replacement in flight:
/// a reader sees either the complete old mapping or the complete new one.
/// Replacements are serialized and wrapped in the listener protocol:
///
/// 1. every listener's `before_reload`, in registration order (any failure
///    aborts and nothing is published);
/// 2. a single atomic pointer swap;
/// 3. every listener's `after_reload`, in registration order (a failure is
///    reported but the new mapping stays live).
///
/// Listener callbacks run synchronously on the thread calling `replace`.
/// They must not call back into `replace` or `register` on the same store.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::{Mapping, PropertyStore};
///
/// let store = PropertyStore::new();
/// store.replace([("foo", "fooval")].into_iter().collect::<Mapping>()).unwrap();
/// assert_eq!(store.read().get("foo"), Some("fooval"));
/// ```
pub struct PropertyStore {
    /// The current mapping, swapped atomically
    current: ArcSwap<Mapping>,
    /// Listeners; the lock also serializes `replace`
    listeners: Mutex<ListenerRegistry>,
}

impl PropertyStore {
    /// Create a store holding an empty mapping.
    pub fn new() -> Self {
        Self::with_mapping(Mapping::new())
    }

    /// Create a store holding an initial mapping.
    pub fn with_mapping(initial: Mapping) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            listeners: Mutex::new(ListenerRegistry::new()),
        }
    }

    /// Get the currently published mapping.
    ///
    /// Lock-free; never blocks on a concurrent `replace`.
    pub fn read(&self) -> Arc<Mapping> {
        self.current.load_full()
    }

    /// Look up a single value in the current mapping.
    pub fn get(&self, key: &str) -> Option<String> {
        self.current.load().get(key).map(str::to_string)
    }

    /// Publish a new mapping, notifying listeners before and after.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ListenerPreFailure` if a listener refused; the old
    ///   mapping is still published and no `after_reload` ran.
    /// - `ConfigError::ListenerPostFailure` if a listener failed after
    ///   publication; the new mapping is live.
    pub fn replace(&self, next: Mapping) -> Result<()> {
        let listeners = self.listeners.lock();
        let next = Arc::new(next);
        let current = self.current.load_full();

        tracing::debug!(listeners = listeners.len(), "Notifying listeners before reload");
        listeners.notify_before(&current, &next)?;

        self.current.store(Arc::clone(&next));
        tracing::info!(properties = next.len(), "Published new property mapping");

        listeners.notify_after(&next).inspect_err(|e| {
            tracing::warn!(error = %e, "Reload published but listener notification is incomplete");
        })
    }

    /// Register a listener built from two closures.
    ///
    /// Listeners only hear about replacements that start after registration.
    pub fn register_listener<B, A>(&self, name: impl Into<String>, before: B, after: A)
    where
        B: Fn(&Mapping, &Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
        A: Fn(&Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnListener::new(name, before, after)));
    }

    /// Register a listener.
    pub fn register(&self, listener: Arc<dyn ReloadListener>) {
        self.listeners.lock().register(listener);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("current", &self.read())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mapping(pairs: &[(&str, &str)]) -> Mapping {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_create_and_read() {
        let store = PropertyStore::with_mapping(mapping(&[("foo", "fooval")]));
        assert_eq!(store.read().get("foo"), Some("fooval"));
        assert_eq!(store.get("foo").as_deref(), Some("fooval"));
        assert!(PropertyStore::new().read().is_empty());
    }

    #[test]
    fn test_listeners_see_old_then_new() {
        let store = PropertyStore::with_mapping(mapping(&[("v", "1")]));
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let before_seen = Arc::clone(&seen);
        let after_seen = Arc::clone(&seen);
        store.register_listener(
            "observer",
            move |current, next| {
                before_seen.lock().push(format!(
                    "before {}->{}",
                    current.get("v").unwrap_or("-"),
                    next.get("v").unwrap_or("-")
                ));
                Ok(())
            },
            move |current| {
                after_seen.lock().push(format!("after {}", current.get("v").unwrap_or("-")));
                Ok(())
            },
        );

        store.replace(mapping(&[("v", "2")])).unwrap();

        assert_eq!(*seen.lock(), vec!["before 1->2", "after 2"]);
    }

    #[test]
    fn test_listener_sees_old_mapping_still_published_before_swap() {
        let store = Arc::new(PropertyStore::with_mapping(mapping(&[("v", "old")])));
        let observed = Arc::new(parking_lot::Mutex::new(None));

        let reader = Arc::clone(&store);
        let slot = Arc::clone(&observed);
        store.register_listener(
            "reader",
            move |_, _| {
                *slot.lock() = reader.read().get("v").map(str::to_string);
                Ok(())
            },
            |_| Ok(()),
        );

        store.replace(mapping(&[("v", "new")])).unwrap();
        assert_eq!(observed.lock().as_deref(), Some("old"));
    }

    #[test]
    fn test_pre_failure_aborts_publication() {
        let store = PropertyStore::with_mapping(mapping(&[("v", "1")]));
        let after_calls = Arc::new(AtomicUsize::new(0));

        let calls = Arc::clone(&after_calls);
        store.register_listener(
            "counter",
            |_, _| Ok(()),
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        store.register_listener("refuser", |_, _| Err("not now".into()), |_| Ok(()));

        let err = store.replace(mapping(&[("v", "2")])).unwrap_err();

        assert!(matches!(err, ConfigError::ListenerPreFailure { index: 1, .. }));
        assert_eq!(store.read().get("v"), Some("1"));
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_post_failure_keeps_publication() {
        let store = PropertyStore::with_mapping(mapping(&[("v", "1")]));
        let late_calls = Arc::new(AtomicUsize::new(0));

        store.register_listener("broken", |_, _| Ok(()), |_| Err("restart failed".into()));
        let calls = Arc::clone(&late_calls);
        store.register_listener(
            "late",
            |_, _| Ok(()),
            move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        let err = store.replace(mapping(&[("v", "2")])).unwrap_err();

        assert!(matches!(err, ConfigError::ListenerPostFailure { index: 0, .. }));
        assert_eq!(store.read().get("v"), Some("2"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_retroactive_notification() {
        let store = PropertyStore::new();
        store.replace(mapping(&[("v", "1")])).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.register_listener(
            "late-joiner",
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| Ok(()),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let store = PropertyStore::with_mapping(mapping(&[("v", "1")]));
        let snapshot = store.read();

        store.replace(mapping(&[("v", "2")])).unwrap();

        assert_eq!(snapshot.get("v"), Some("1"));
        assert_eq!(store.read().get("v"), Some("2"));
    }
}
