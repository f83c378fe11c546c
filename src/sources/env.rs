//! Environment variable property source.

use super::PropertySource;
use crate::error::{ConfigError, Result};
use config::{Environment, Source};
use std::collections::HashMap;
use std::env;

/// Environment variable property source.
///
/// Picks up variables starting with `PREFIX_`, strips the prefix, lowercases
/// the rest and turns the separator into dots, so that with prefix `APP` and
/// separator `__`, `APP_POOL__SIZE=8` becomes `pool.size=8`.
///
/// The environment has no modification marker: a change to it is picked up
/// by the next reload triggered by another source, or a forced reload.
///
/// # Examples
///
/// ```rust
/// use hotswap_props::sources::{EnvSource, PropertySource};
///
/// let source = EnvSource::new("APP", "__").with_vars([("APP_POOL__SIZE", "8")]);
/// assert_eq!(source.load().unwrap()["pool.size"], "8");
/// ```
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
    vars: Option<config::Map<String, String>>,
}

impl EnvSource {
    /// Create a new environment variable source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            vars: None,
        }
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    fn environment(&self) -> Environment {
        // Non-unicode variables are skipped; config would panic on them
        let vars = self.vars.clone().unwrap_or_else(|| {
            env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect()
        });

        let environment = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .source(Some(vars));
        if self.separator.is_empty() {
            environment
        } else {
            environment.separator(&self.separator)
        }
    }
}

impl PropertySource for EnvSource {
    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        let read_error = |e: config::ConfigError| ConfigError::SourceRead {
            name: self.name(),
            reason: e.to_string(),
        };

        Source::collect(&self.environment())
            .map_err(read_error)?
            .into_iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| Ok((key, value.into_string().map_err(read_error)?)))
            .collect()
    }
}
