use std::fmt;
use tracing::{debug, info};

/// Secret used to authenticate against the generative-language API.
///
/// The value never shows up in `Debug` output, so it is safe to log structs
/// that carry one.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key. Blank input counts as "no key".
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Reads the first non-empty variable among `names` from the process
    /// environment.
    pub fn from_env(names: &[String]) -> Option<Self> {
        Self::resolve(names, |name| std::env::var(name).ok())
    }

    /// Same as [`ApiKey::from_env`] with an explicit lookup, so callers and
    /// tests do not have to touch the real environment.
    pub fn resolve<F>(names: &[String], lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in names {
            if let Some(key) = lookup(name).and_then(Self::new) {
                info!(variable = %name, "API key found in environment");
                return Some(key);
            }
            debug!(variable = %name, "No API key in variable");
        }
        None
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
