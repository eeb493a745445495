//! Per-profile default values.
//!
//! A key declared with [`DetailedKey`](crate::env_schema::DetailedKey) may
//! carry a [`ProfileDefaults`] table mapping profile names (`production`,
//! `staging`, ...) to the value to use when the key is absent. The entry
//! named [`FALLBACK_PROFILE`] applies to any profile without its own entry.
//!
//! # Example
//!
//! ```
//! use preflight::defaults::{resolve_default, ProfileDefaults};
//! use preflight::Value;
//!
//! let defaults = ProfileDefaults::new()
//!     .fallback("x")
//!     .set("production", "y");
//!
//! assert_eq!(resolve_default(Some(&defaults), Some("production")), Some(Value::from("y")));
//! assert_eq!(resolve_default(Some(&defaults), Some("staging")), Some(Value::from("x")));
//! ```

use crate::value::Value;

/// Profile name whose entry applies when the active profile has none.
pub const FALLBACK_PROFILE: &str = "_";

/// Ordered table of profile name to default value.
///
/// A value of [`Value::Undefined`] is a real entry: it means "the default for
/// this profile is absence", which still counts as having a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDefaults {
    entries: Vec<(String, Value)>,
}

impl ProfileDefaults {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default for `profile`, replacing any earlier entry.
    pub fn set(mut self, profile: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(profile.into(), value.into());
        self
    }

    /// Set the default used when the active profile has no entry.
    pub fn fallback(self, value: impl Into<Value>) -> Self {
        self.set(FALLBACK_PROFILE, value)
    }

    /// Set the default for `profile` in place.
    pub fn insert(&mut self, profile: String, value: Value) {
        match self.entries.iter_mut().find(|(p, _)| *p == profile) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((profile, value)),
        }
    }

    /// The entry for exactly `profile`, if any.
    pub fn get(&self, profile: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(p, _)| p == profile)
            .map(|(_, v)| v)
    }

    /// Whether `profile` has its own entry.
    pub fn contains(&self, profile: &str) -> bool {
        self.get(profile).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for ProfileDefaults
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut defaults = ProfileDefaults::new();
        for (k, v) in iter {
            defaults.insert(k.into(), v.into());
        }
        defaults
    }
}

/// Pick the default for `active_profile`.
///
/// First match wins:
///
/// 1. the active profile's own entry;
/// 2. the [`FALLBACK_PROFILE`] entry;
/// 3. no default (`None`).
///
/// `Some(Value::Undefined)` is a default whose value is absence.
pub fn resolve_default(
    defaults: Option<&ProfileDefaults>,
    active_profile: Option<&str>,
) -> Option<Value> {
    let defaults = defaults?;
    active_profile
        .and_then(|profile| defaults.get(profile))
        .or_else(|| defaults.get(FALLBACK_PROFILE))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ProfileDefaults {
        ProfileDefaults::new().fallback("x").set("production", "y")
    }

    #[test]
    fn test_active_profile_wins() {
        assert_eq!(
            resolve_default(Some(&table()), Some("production")),
            Some(Value::from("y"))
        );
    }

    #[test]
    fn test_unknown_profile_uses_fallback() {
        assert_eq!(
            resolve_default(Some(&table()), Some("staging")),
            Some(Value::from("x"))
        );
    }

    #[test]
    fn test_no_profile_uses_fallback() {
        assert_eq!(resolve_default(Some(&table()), None), Some(Value::from("x")));
    }

    #[test]
    fn test_no_fallback_means_no_default() {
        let empty = ProfileDefaults::new();
        assert_eq!(resolve_default(Some(&empty), Some("staging")), None);

        let only_prod = ProfileDefaults::new().set("production", 1);
        assert_eq!(resolve_default(Some(&only_prod), Some("staging")), None);
        assert_eq!(resolve_default(None, Some("production")), None);
    }

    #[test]
    fn test_undefined_entry_still_counts() {
        let defaults = ProfileDefaults::new()
            .fallback("x")
            .set("test", Value::Undefined);
        assert_eq!(
            resolve_default(Some(&defaults), Some("test")),
            Some(Value::Undefined)
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let defaults = ProfileDefaults::new()
            .set("a", 1)
            .set("b", 2)
            .set("a", 3);
        let entries: Vec<_> = defaults.iter().map(|(p, v)| (p.to_string(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), Value::Number(3.0)),
                ("b".to_string(), Value::Number(2.0)),
            ]
        );
    }

    #[test]
    fn test_from_iterator() {
        let defaults: ProfileDefaults = [("_", "dev"), ("production", "prod")].into_iter().collect();
        assert_eq!(defaults.len(), 2);
        assert!(defaults.contains("production"));
    }
}
