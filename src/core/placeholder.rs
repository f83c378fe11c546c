//! Placeholders with inline defaults: `${name=default}`.

use crate::core::Mapping;
use crate::error::{ConfigError, Result};

/// Default placeholder prefix.
pub const DEFAULT_PREFIX: &str = "${";

/// Default placeholder suffix.
pub const DEFAULT_SUFFIX: &str = "}";

/// Default separator between the placeholder name and its default value.
pub const DEFAULT_SEPARATOR: &str = "=";

/// The parsed contents of one placeholder, between prefix and suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderToken<'a> {
    /// The key to look up.
    pub name: &'a str,
    /// The inline default, if the token contained a separator.
    pub default: Option<&'a str>,
}

/// What to do with a placeholder that has no value and no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Fail with `ConfigError::UnresolvedPlaceholder`.
    #[default]
    Fail,
    /// Leave the raw placeholder text in place.
    Keep,
}

/// Resolves `PREFIX name [SEP default] SUFFIX` placeholders.
///
/// The value found by the lookup always wins, even when it is an empty
/// string. The inline default is used only when the lookup finds nothing.
/// Only the first separator splits, so defaults may contain it
/// (`${url=http://host/?a=b}`).
///
/// # Examples
///
/// ```rust
/// use hotswap_props::core::PlaceholderResolver;
///
/// let resolver = PlaceholderResolver::new();
/// let resolved = resolver.resolve("driver=org.h2.Driver", |_| None);
/// assert_eq!(resolved.as_deref(), Some("org.h2.Driver"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderResolver {
    prefix: String,
    suffix: String,
    separator: String,
}

impl PlaceholderResolver {
    /// Create a resolver using `${`, `}` and `=`.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Set the placeholder prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the placeholder suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the string separating the name from the default value.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Split a token into name and default at the first separator.
    pub fn parse<'a>(&self, token: &'a str) -> PlaceholderToken<'a> {
        // An empty separator would split every token at position 0.
        if self.separator.is_empty() {
            return PlaceholderToken { name: token, default: None };
        }
        match token.split_once(self.separator.as_str()) {
            Some((name, default)) => PlaceholderToken {
                name,
                default: Some(default),
            },
            None => PlaceholderToken { name: token, default: None },
        }
    }

    /// Resolve a single token (the text between prefix and suffix).
    pub fn resolve<F>(&self, token: &str, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = self.parse(token);
        lookup(parsed.name).or_else(|| parsed.default.map(str::to_string))
    }

    /// Replace every placeholder in `text`.
    ///
    /// Placeholders are single-level: the first suffix after a prefix closes
    /// it, and resolved values are not scanned again. An unterminated prefix
    /// is copied as-is.
    ///
    /// # Errors
    ///
    /// With `UnresolvedPolicy::Fail`, returns `ConfigError::UnresolvedPlaceholder`
    /// for the first placeholder that has neither a value nor a default.
    pub fn substitute<F>(&self, text: &str, lookup: F, policy: UnresolvedPolicy) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.prefix.is_empty() || self.suffix.is_empty() {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(self.prefix.as_str()) {
            let after_prefix = &rest[start + self.prefix.len()..];
            let Some(end) = after_prefix.find(self.suffix.as_str()) else {
                break;
            };

            out.push_str(&rest[..start]);
            let token = &after_prefix[..end];
            match self.resolve(token, &lookup) {
                Some(value) => out.push_str(&value),
                None => match policy {
                    UnresolvedPolicy::Fail => {
                        return Err(ConfigError::UnresolvedPlaceholder {
                            placeholder: self.parse(token).name.to_string(),
                        });
                    }
                    UnresolvedPolicy::Keep => {
                        out.push_str(&self.prefix);
                        out.push_str(token);
                        out.push_str(&self.suffix);
                    }
                },
            }
            rest = &after_prefix[end + self.suffix.len()..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Replace every placeholder in `text` with values from a snapshot.
    pub fn substitute_from(
        &self,
        text: &str,
        mapping: &Mapping,
        policy: UnresolvedPolicy,
    ) -> Result<String> {
        self.substitute(text, |name| mapping.get(name).map(str::to_string), policy)
    }
}

impl Default for PlaceholderResolver {
    fn default() -> Self {
        Self::new()
    }
}
