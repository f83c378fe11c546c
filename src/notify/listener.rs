//! Reconfiguration hooks invoked around a property swap.

use crate::core::Mapping;
use crate::error::{BoxError, ConfigError, Result};
use std::sync::Arc;

/// A component that needs to quiesce before, and resume after, a reload.
///
/// `before_reload` runs while the old mapping is still live; returning an
/// error aborts the reload and nothing is published. `after_reload` runs once
/// the new mapping is visible to readers.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::Mapping;
/// use hotswap_props::error::BoxError;
/// use hotswap_props::notify::ReloadListener;
///
/// struct Pool;
///
/// impl ReloadListener for Pool {
///     fn name(&self) -> String {
///         "pool".to_string()
///     }
///
///     fn before_reload(&self, _current: &Mapping, _next: &Mapping) -> Result<(), BoxError> {
///         // drain connections sized by the old settings
///         Ok(())
///     }
///
///     fn after_reload(&self, current: &Mapping) -> Result<(), BoxError> {
///         let _size = current.get_parsed::<usize>("pool.size")?;
///         Ok(())
///     }
/// }
/// ```
pub trait ReloadListener: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Called before `next` replaces `current`.
    fn before_reload(&self, current: &Mapping, next: &Mapping) -> std::result::Result<(), BoxError>;

    /// Called after `current` has been published.
    fn after_reload(&self, current: &Mapping) -> std::result::Result<(), BoxError>;
}

type BeforeFn = Box<dyn Fn(&Mapping, &Mapping) -> std::result::Result<(), BoxError> + Send + Sync>;
type AfterFn = Box<dyn Fn(&Mapping) -> std::result::Result<(), BoxError> + Send + Sync>;

/// A `ReloadListener` built from a pair of closures.
pub struct FnListener {
    name: String,
    before: BeforeFn,
    after: AfterFn,
}

impl FnListener {
    /// Create a listener from its two callbacks.
    pub fn new<B, A>(name: impl Into<String>, before: B, after: A) -> Self
    where
        B: Fn(&Mapping, &Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
        A: Fn(&Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            before: Box::new(before),
            after: Box::new(after),
        }
    }
}

impl ReloadListener for FnListener {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn before_reload(&self, current: &Mapping, next: &Mapping) -> std::result::Result<(), BoxError> {
        (self.before)(current, next)
    }

    fn after_reload(&self, current: &Mapping) -> std::result::Result<(), BoxError> {
        (self.after)(current)
    }
}

/// Ordered, append-only list of reload listeners.
///
/// Not synchronized on its own; the store keeps it behind the same lock that
/// serializes replacements.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn ReloadListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener.
    pub fn register(&mut self, listener: Arc<dyn ReloadListener>) {
        tracing::debug!(listener = %listener.name(), position = self.listeners.len(), "Registered reload listener");
        self.listeners.push(listener);
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run every `before_reload` in registration order, stopping at the first failure.
    pub fn notify_before(&self, current: &Mapping, next: &Mapping) -> Result<()> {
        for (index, listener) in self.listeners.iter().enumerate() {
            listener
                .before_reload(current, next)
                .map_err(|source| ConfigError::ListenerPreFailure {
                    index,
                    listener: listener.name(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Run every `after_reload` in registration order, stopping at the first failure.
    pub fn notify_after(&self, current: &Mapping) -> Result<()> {
        for (index, listener) in self.listeners.iter().enumerate() {
            listener
                .after_reload(current)
                .map_err(|source| ConfigError::ListenerPostFailure {
                    index,
                    listener: listener.name(),
                    source,
                })?;
        }
        Ok(())
    }
}
