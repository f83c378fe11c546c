//! Error types for hotswap-props.

/// Result type alias for hotswap-props operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Boxed error returned by reload listener callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading, reloading or resolving properties.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source's resource does not exist.
    ///
    /// Skipped during a reload when the source is registered as optional,
    /// otherwise the whole reload is aborted.
    #[error("Property source '{name}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Name of the source
        name: String,
        /// Why the resource could not be opened
        reason: String,
    },

    /// A source exists but could not be read or parsed.
    ///
    /// Always aborts the reload; the store keeps its previous mapping.
    #[error("Failed to read property source '{name}': {reason}")]
    SourceRead {
        /// Name of the source
        name: String,
        /// The underlying I/O or parse failure
        reason: String,
    },

    /// A listener rejected the upcoming replacement. Nothing was published.
    #[error("Listener #{index} ('{listener}') aborted the reload: {source}")]
    ListenerPreFailure {
        /// Position of the listener in registration order
        index: usize,
        /// Listener name
        listener: String,
        /// The error raised by the listener
        #[source]
        source: BoxError,
    },

    /// A listener failed after the new mapping had been published.
    ///
    /// The new mapping stays live; listeners registered after this one were
    /// not notified.
    #[error("Listener #{index} ('{listener}') failed after the reload was published: {source}")]
    ListenerPostFailure {
        /// Position of the listener in registration order
        index: usize,
        /// Listener name
        listener: String,
        /// The error raised by the listener
        #[source]
        source: BoxError,
    },

    /// A placeholder had neither a value nor an inline default.
    #[error("Could not resolve placeholder '{placeholder}'")]
    UnresolvedPlaceholder {
        /// The placeholder name that was looked up
        placeholder: String,
    },

    /// A value or setting could not be parsed.
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// File watching failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Whether this error means the resource is missing, as opposed to broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
