//! Builder for constructing Reloader instances.

use crate::core::{Mapping, PropertyStore, Reloader, SourceDescriptor};
use crate::error::{BoxError, Result};
use crate::notify::{FnListener, ReloadListener};
use crate::sources::{EnvSource, FileSource, PropertySource};
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::ConfigMetrics;

/// A source waiting to be turned into a descriptor at build time.
enum PendingSource {
    File(PathBuf),
    Custom(Arc<dyn PropertySource>),
}

/// Builder for constructing a `Reloader`.
///
/// Sources are added in precedence order: each source overrides keys from
/// the ones added before it. Environment overrides, when enabled, come last.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::prelude::*;
///
/// # fn example() -> Result<()> {
/// let reloader = Reloader::builder()
///     .with_file("config/defaults.properties")
///     .with_optional_file("/etc/myapp/overrides.xml")
///     .with_env_overrides("MYAPP", "__")
///     .with_listener_fns(
///         "pool",
///         |_current, _next| Ok(()),
///         |current| {
///             println!("pool size now {:?}", current.get("pool.size"));
///             Ok(())
///         },
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ReloaderBuilder {
    sources: Vec<(PendingSource, bool)>,
    file_encoding: Option<String>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    listeners: Vec<Arc<dyn ReloadListener>>,
    store: Option<Arc<PropertyStore>>,
    #[cfg(feature = "metrics")]
    metrics: Option<ConfigMetrics>,
}

impl ReloaderBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            file_encoding: None,
            env_prefix: None,
            env_separator: None,
            listeners: Vec::new(),
            store: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Add a property file that must exist.
    ///
    /// Files ending in `.xml` are read as XML property lists, anything else
    /// as `key=value` text.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push((PendingSource::File(path.into()), false));
        self
    }

    /// Add a property file that is skipped while it does not exist.
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push((PendingSource::File(path.into()), true));
        self
    }

    /// Decode every file source with this encoding instead of UTF-8.
    ///
    /// An unknown label makes `build` fail.
    pub fn with_file_encoding(mut self, label: impl Into<String>) -> Self {
        self.file_encoding = Some(label.into());
        self
    }

    /// Add a custom property source that must be available.
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.sources.push((PendingSource::Custom(Arc::new(source)), false));
        self
    }

    /// Add a custom property source that is skipped while unavailable.
    pub fn with_optional_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.sources.push((PendingSource::Custom(Arc::new(source)), true));
        self
    }

    /// Add a shared property source, keeping a handle to it.
    pub fn with_shared_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.sources.push((PendingSource::Custom(source), false));
        self
    }

    /// Let environment variables override every other source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Register a reload listener.
    pub fn with_listener<L: ReloadListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Register a reload listener built from two closures.
    pub fn with_listener_fns<B, A>(self, name: impl Into<String>, before: B, after: A) -> Self
    where
        B: Fn(&Mapping, &Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
        A: Fn(&Mapping) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.with_listener(FnListener::new(name, before, after))
    }

    /// Publish into an existing store instead of creating one.
    pub fn with_store(mut self, store: Arc<PropertyStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Record reload metrics.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(ConfigMetrics::new(meter));
        self
    }

    /// Build the reloader and perform the initial forced reload.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file encoding label is unknown
    /// - A required source is missing or unreadable
    /// - A listener refuses the initial mapping
    pub fn build(self) -> Result<Reloader> {
        let reloader = self.build_lazy()?;
        reloader.reload(true)?;
        Ok(reloader)
    }

    /// Build the reloader without loading anything yet.
    ///
    /// The store stays as it is until the first `reload`.
    pub fn build_lazy(self) -> Result<Reloader> {
        let mut sources: Vec<(Arc<dyn PropertySource>, bool)> = Vec::with_capacity(self.sources.len() + 1);

        for (pending, optional) in self.sources {
            let source: Arc<dyn PropertySource> = match pending {
                PendingSource::File(path) => {
                    let mut file = FileSource::new(path);
                    if let Some(label) = &self.file_encoding {
                        file = file.with_encoding(label)?;
                    }
                    Arc::new(file)
                }
                PendingSource::Custom(source) => source,
            };
            sources.push((source, optional));
        }

        // Environment overrides have the highest precedence
        if let (Some(prefix), Some(separator)) = (self.env_prefix, self.env_separator) {
            let env: Arc<dyn PropertySource> = Arc::new(EnvSource::new(prefix, separator));
            sources.push((env, false));
        }

        let descriptors = sources
            .into_iter()
            .enumerate()
            .map(|(rank, (source, optional))| SourceDescriptor::new(source, rank, optional))
            .collect();

        let store = self.store.unwrap_or_default();
        for listener in self.listeners {
            store.register(listener);
        }

        let reloader = Reloader::new(store, descriptors);
        #[cfg(feature = "metrics")]
        let reloader = match self.metrics {
            Some(metrics) => reloader.with_metrics(metrics),
            None => reloader,
        };

        Ok(reloader)
    }
}

impl Default for ReloaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
