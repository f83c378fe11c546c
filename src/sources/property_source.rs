//! Property source trait.

use crate::core::Marker;
use crate::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// A place properties are loaded from.
///
/// Implement this trait to plug in custom loading strategies (other formats,
/// embedded resources, databases).
pub trait PropertySource: Send + Sync {
    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Load every property this source defines.
    ///
    /// # Errors
    ///
    /// Return `ConfigError::SourceUnavailable` when the underlying resource
    /// does not exist, and `ConfigError::SourceRead` for any other failure.
    fn load(&self) -> Result<HashMap<String, String>>;

    /// Get the current modification marker.
    ///
    /// `Ok(None)` means the source cannot tell when it changed; such a source
    /// never triggers a reload on its own. The default implementation returns
    /// `Ok(None)`.
    fn marker(&self) -> std::io::Result<Option<Marker>> {
        Ok(None)
    }

    /// Filesystem path backing this source, if any, for event-based triggers.
    fn path(&self) -> Option<&Path> {
        None
    }
}
