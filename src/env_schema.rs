//! The schema map: which keys to read and how.
//!
//! # Example
//!
//! ```
//! use preflight::prelude::*;
//!
//! let schema = EnvSchema::new()
//!     .key("PORT", schema::number().int())
//!     .key("DEBUG", schema::boolean().optional())
//!     .detailed(
//!         "STAGE",
//!         DetailedKey::new(schema::string())
//!             .description("deployment stage")
//!             .fallback_default("dev"),
//!     );
//! assert_eq!(schema.len(), 3);
//! ```

use crate::coerce::synthesize;
use crate::defaults::ProfileDefaults;
use crate::error::UnsupportedTypeError;
use crate::schema::Schema;
use crate::value::Value;

/// A schema plus the metadata a key can carry.
#[derive(Debug, Clone)]
pub struct DetailedKey {
    pub schema: Schema,
    pub description: Option<String>,
    pub defaults: Option<ProfileDefaults>,
}

impl DetailedKey {
    pub fn new(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            description: None,
            defaults: None,
        }
    }

    /// Description shown in failure reports.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the whole per-profile defaults table.
    pub fn defaults(mut self, defaults: ProfileDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Default for one profile.
    pub fn default_for(mut self, profile: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults
            .get_or_insert_with(ProfileDefaults::new)
            .insert(profile.into(), value.into());
        self
    }

    /// Default for any profile without its own entry.
    pub fn fallback_default(self, value: impl Into<Value>) -> Self {
        self.default_for(crate::defaults::FALLBACK_PROFILE, value)
    }
}

/// How one key is declared.
#[derive(Debug, Clone)]
pub enum KeySchema {
    Bare(Schema),
    Detailed(DetailedKey),
}

impl KeySchema {
    /// The schema the key's value is validated against.
    pub fn schema(&self) -> &Schema {
        match self {
            KeySchema::Bare(schema) => schema,
            KeySchema::Detailed(detailed) => &detailed.schema,
        }
    }

    /// The key's description: the declared one, else the schema's own.
    pub fn description(&self) -> Option<&str> {
        match self {
            KeySchema::Bare(schema) => schema.description(),
            KeySchema::Detailed(detailed) => detailed
                .description
                .as_deref()
                .or_else(|| detailed.schema.description()),
        }
    }

    /// Per-profile defaults, for detailed declarations.
    pub fn profile_defaults(&self) -> Option<&ProfileDefaults> {
        match self {
            KeySchema::Bare(_) => None,
            KeySchema::Detailed(detailed) => detailed.defaults.as_ref(),
        }
    }
}

impl From<DetailedKey> for KeySchema {
    fn from(detailed: DetailedKey) -> Self {
        KeySchema::Detailed(detailed)
    }
}

impl From<Schema> for KeySchema {
    fn from(schema: Schema) -> Self {
        KeySchema::Bare(schema)
    }
}

/// Ordered mapping from key name to declaration.
///
/// Declaration order is kept and determines the order of failures in reports.
#[derive(Debug, Clone, Default)]
pub struct EnvSchema {
    entries: Vec<(String, KeySchema)>,
}

impl EnvSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a key with a bare schema.
    pub fn key(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.insert(name, KeySchema::Bare(schema.into()));
        self
    }

    /// Declare a key with a schema plus description and defaults.
    pub fn detailed(mut self, name: impl Into<String>, detailed: DetailedKey) -> Self {
        self.insert(name, KeySchema::Detailed(detailed));
        self
    }

    /// Declare a key. Redeclaring replaces the earlier declaration in place.
    pub fn insert(&mut self, name: impl Into<String>, declaration: KeySchema) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = declaration,
            None => self.entries.push((name, declaration)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KeySchema> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, declaration)| declaration)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeySchema)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Build every key's coercer now, so an unsupported type surfaces before
    /// any environment is read.
    ///
    /// # Errors
    ///
    /// Returns the first [`UnsupportedTypeError`] in declaration order.
    pub fn check_supported(&self) -> Result<(), UnsupportedTypeError> {
        for (_, declaration) in self.iter() {
            let _coercer = synthesize(declaration.schema())?;
        }
        Ok(())
    }
}
