//! Core property management types.

mod builder;
mod mapping;
mod placeholder;
mod reloader;
mod store;
mod watcher;

pub use builder::ReloaderBuilder;
pub use mapping::Mapping;
pub use placeholder::{
    DEFAULT_PREFIX, DEFAULT_SEPARATOR, DEFAULT_SUFFIX, PlaceholderResolver, PlaceholderToken,
    UnresolvedPolicy,
};
pub use reloader::Reloader;
pub use store::PropertyStore;
pub use watcher::{ChangeReport, Marker, SourceDescriptor, SourceWatcher};
