//! Key/value sources for extraction.
//!
//! The [`Lookup`] trait is the only contract the crate needs from a backing
//! store: given a key, return its raw string value if one exists. The process
//! environment ([`RealEnv`]), an in-memory [`MockEnv`] for tests and plain
//! string maps all implement it. [`Extractor`] pairs a source with a
//! [`ParserConfig`] so chains can be started from a key alone.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::config::ParserConfig;
use crate::step::ConversionStep;

/// A string-keyed source of raw values.
///
/// # Example
///
/// ```
/// use sluice::env::{Lookup, MockEnv};
///
/// let env = MockEnv::new().with_env("PORT", "8080");
/// assert_eq!(env.lookup("PORT"), Some("8080".to_string()));
/// assert_eq!(env.lookup("HOST"), None);
/// ```
pub trait Lookup: Send + Sync {
    /// The value stored under `key`, `None` when absent.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl Lookup for RealEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment for tests.
///
/// Values can be changed after construction through a shared reference, so a
/// single `MockEnv` can back an [`Extractor`] while a test mutates it.
///
/// # Example
///
/// ```
/// use sluice::env::{Lookup, MockEnv};
///
/// let env = MockEnv::new()
///     .with_env("APP_HOST", "localhost")
///     .with_envs([("APP_PORT", "8080"), ("APP_DEBUG", "yes")]);
///
/// env.set_env("APP_HOST", "db.example.com");
/// env.remove_env("APP_DEBUG");
///
/// assert_eq!(env.lookup("APP_HOST"), Some("db.example.com".to_string()));
/// assert_eq!(env.lookup("APP_DEBUG"), None);
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    env_vars: RwLock<HashMap<String, String>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env_vars = self
            .env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (k, v) in vars {
            env_vars.insert(k.into(), v.into());
        }
        drop(env_vars);
        self
    }

    /// Update an environment variable.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Remove an environment variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl Lookup for MockEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Starts extraction chains by key.
///
/// # Example
///
/// ```
/// use sluice::prelude::*;
///
/// let env = MockEnv::new().with_env("PORT", "42158");
/// let source = Extractor::new(env);
///
/// let port = source.extract("PORT").as_int().range(1..=65535);
/// assert_eq!(port.required(), Ok(42158));
///
/// let missing = source.extract("KEY").min_length(6);
/// assert_eq!(missing.default_value("default".to_string()), "default");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor<L> {
    source: L,
    config: ParserConfig,
}

impl<L: Lookup> Extractor<L> {
    /// Extractor over `source` with the default (POSIX) config.
    pub fn new(source: L) -> Self {
        Self::with_config(source, ParserConfig::default())
    }

    /// Extractor over `source` with an explicit config.
    pub fn with_config(source: L, config: ParserConfig) -> Self {
        Self { source, config }
    }

    /// Look `key` up and start a chain for its value.
    ///
    /// The value is read once, here; the returned chain never consults the
    /// source again.
    pub fn extract(&self, key: &str) -> ConversionStep<String, String> {
        let value = self.source.lookup(key);
        tracing::trace!(key, found = value.is_some(), "looked up key");
        self.config.extract(value.as_deref(), Some(key))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn source(&self) -> &L {
        &self.source
    }
}

impl Extractor<RealEnv> {
    /// Extractor over the process environment, with the locale detected by
    /// [`Locale::from_lookup`](crate::Locale::from_lookup).
    pub fn from_env() -> Self {
        let config = ParserConfig::new(crate::locale::Locale::from_lookup(&RealEnv));
        Self::with_config(RealEnv, config)
    }
}
