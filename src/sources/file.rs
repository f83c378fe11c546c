//! File-based property source.

use super::PropertySource;
use super::format::{SourceFormat, decode};
use crate::core::Marker;
use crate::error::{ConfigError, Result};
use encoding_rs::Encoding;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-based property source.
///
/// Loads `key=value` text, or an XML property list when the file name ends
/// in `.xml`. The file's modification time is its change marker.
///
/// Content is decoded as UTF-8 unless an encoding is set. Bytes that are not
/// valid UTF-8 fail the read instead of being replaced, so legacy Latin-1
/// `.properties` files need `with_encoding("ISO-8859-1")`.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_props::sources::FileSource;
///
/// let source = FileSource::new("config/app.properties")
///     .with_encoding("ISO-8859-1")
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: SourceFormat,
    encoding: Option<&'static Encoding>,
}

impl FileSource {
    /// Create a new file source, choosing the format from the extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            format: SourceFormat::from_path(&path),
            path,
            encoding: None,
        }
    }

    /// Override the text encoding (any WHATWG label, e.g. `"ISO-8859-1"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the label is not a known encoding.
    pub fn with_encoding(mut self, label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ConfigError::Parse(format!("Unknown encoding: {}", label)))?;
        self.encoding = Some(encoding);
        Ok(self)
    }

    /// Override the format detected from the extension.
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    /// Detected or configured format.
    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

impl PropertySource for FileSource {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::SourceUnavailable {
                name: self.name(),
                reason: e.to_string(),
            },
            _ => ConfigError::SourceRead {
                name: self.name(),
                reason: e.to_string(),
            },
        })?;

        let read_error = |reason: String| ConfigError::SourceRead {
            name: self.name(),
            reason,
        };
        let text = decode(&bytes, self.encoding.unwrap_or(encoding_rs::UTF_8)).map_err(read_error)?;
        let entries = self.format.parse(&text).map_err(read_error)?;

        tracing::debug!(source = %self.name(), properties = entries.len(), "Loaded property file");
        Ok(entries)
    }

    fn marker(&self) -> std::io::Result<Option<Marker>> {
        // A missing file has no marker; loading decides whether that is fatal
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(Some(Marker::from(metadata.modified()?)))
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
