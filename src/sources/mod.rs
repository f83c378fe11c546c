//! Property source implementations.

mod env;
mod file;
mod format;
mod memory;
mod property_source;

pub use env::EnvSource;
pub use file::FileSource;
pub use format::{SourceFormat, parse_properties};
pub use memory::MemorySource;
pub use property_source::PropertySource;

#[cfg(feature = "xml")]
pub use format::parse_xml;
