//! EnvSource trait for testable environment access.
//!
//! The parser never reads `std::env` directly. It asks an [`EnvSource`], so
//! tests can inject a [`MockEnv`] (or a plain map) instead of mutating the
//! process environment.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

/// A flat dictionary of string keys to string-or-absent values.
///
/// # Example
///
/// ```
/// use preflight::prelude::*;
///
/// let schema = EnvSchema::new().key("PORT", schema::number());
///
/// // Production
/// let parsed = parse_env(&schema, &RealEnv::new());
///
/// // Testing
/// let env = MockEnv::new().with_env("PORT", "8080");
/// let parsed = parse_env(&schema, &env).unwrap();
/// assert_eq!(parsed.get_as::<u16>("PORT").unwrap(), 8080);
/// ```
pub trait EnvSource: Send + Sync {
    /// Get a variable by name.
    ///
    /// Returns `None` if the variable is not set.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Get every variable, in no particular order.
    fn all_env_vars(&self) -> Vec<(String, String)>;

    /// Get every variable whose name starts with `prefix`.
    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.all_env_vars()
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect()
    }
}

/// The process environment.
///
/// Variables whose value is not valid unicode read as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl EnvSource for RealEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// In-memory environment for tests.
///
/// # Example
///
/// ```
/// use preflight::env::{EnvSource, MockEnv};
///
/// let env = MockEnv::new()
///     .with_env("APP_ENV", "production")
///     .with_env("PORT", "8080");
///
/// assert_eq!(env.get_env("PORT"), Some("8080".to_string()));
/// env.remove_env("PORT");
/// assert_eq!(env.get_env("PORT"), None);
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

    /// Set a variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Set multiple variables from an iterator.
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

    /// Update a variable after creation.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Remove a variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl EnvSource for MockEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<S> EnvSource for HashMap<String, String, S>
where
    S: std::hash::BuildHasher + Send + Sync,
{
    fn get_env(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get_env(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_env_reads_process() {
        let env = RealEnv::new();
        assert_eq!(env.get_env("PREFLIGHT_SURELY_UNSET_VARIABLE"), None);
        // PATH is set on every platform the tests run on
        assert!(env.get_env("PATH").is_some());
        assert!(env.all_env_vars().iter().any(|(k, _)| k == "PATH"));
    }

    #[test]
    fn test_mock_env_vars() {
        let env = MockEnv::new()
            .with_env("APP_HOST", "localhost")
            .with_env("APP_PORT", "8080")
            .with_env("OTHER_VAR", "value");

        assert_eq!(env.get_env("APP_HOST"), Some("localhost".to_string()));
        assert_eq!(env.get_env("APP_PORT"), Some("8080".to_string()));
        assert_eq!(env.get_env("MISSING"), None);

        let app_vars = env.env_vars_with_prefix("APP_");
        assert_eq!(app_vars.len(), 2);

        let all_vars = env.all_env_vars();
        assert_eq!(all_vars.len(), 3);
    }

    #[test]
    fn test_mock_env_with_envs() {
        let env = MockEnv::new().with_envs([("A", "1"), ("B", "2")]);
        assert_eq!(env.get_env("A"), Some("1".to_string()));
        assert_eq!(env.get_env("B"), Some("2".to_string()));
    }

    #[test]
    fn test_mock_env_mutations() {
        let env = MockEnv::new().with_env("VAR", "original");

        env.set_env("VAR", "modified");
        assert_eq!(env.get_env("VAR"), Some("modified".to_string()));

        env.remove_env("VAR");
        assert_eq!(env.get_env("VAR"), None);
    }

    #[test]
    fn test_empty_string_is_present() {
        let env = MockEnv::new().with_env("EMPTY", "");
        assert_eq!(env.get_env("EMPTY"), Some(String::new()));
    }

    #[test]
    fn test_maps_are_sources() {
        let mut hash = HashMap::new();
        hash.insert("PORT".to_string(), "3000".to_string());
        assert_eq!(hash.get_env("PORT"), Some("3000".to_string()));
        assert_eq!(hash.get_env("HOST"), None);

        let mut tree = BTreeMap::new();
        tree.insert("PORT".to_string(), "3000".to_string());
        tree.insert("HOST".to_string(), "localhost".to_string());
        assert_eq!(tree.get_env("HOST"), Some("localhost".to_string()));
        assert_eq!(tree.env_vars_with_prefix("PO").len(), 1);
    }
}
