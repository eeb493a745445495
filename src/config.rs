//! Entry points: `parse_env`, `EnvParser` and the read-only `ParsedEnv`.

use serde::de::DeserializeOwned;
use stillwater::Validation;

use crate::env::{EnvSource, RealEnv};
use crate::env_schema::EnvSchema;
use crate::error::ParseEnvError;
use crate::parser::parse_all;
use crate::report::ReportOptions;
use crate::validate::EnvMessages;
use crate::value::Value;

/// Variable consulted for the active profile unless configured otherwise.
pub const DEFAULT_PROFILE_KEY: &str = "APP_ENV";

/// A fully validated environment.
///
/// Keys are exactly the declared keys, in declaration order. A key whose
/// schema accepted absence maps to [`Value::Undefined`]. There is no mutable
/// access.
///
/// Values cannot be written through [`ParsedEnv::get`]:
///
/// ```compile_fail
/// use preflight::prelude::*;
///
/// let schema = EnvSchema::new().key("PORT", schema::number());
/// let parsed = parse_env(&schema, &MockEnv::new().with_env("PORT", "80")).unwrap();
/// *parsed.get("PORT").unwrap() = Value::Number(81.0);
/// ```
///
/// and there is no `get_mut`:
///
/// ```compile_fail
/// use preflight::prelude::*;
///
/// let schema = EnvSchema::new().key("PORT", schema::number());
/// let mut parsed = parse_env(&schema, &MockEnv::new().with_env("PORT", "80")).unwrap();
/// *parsed.get_mut("PORT").unwrap() = Value::Number(81.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEnv {
    entries: Vec<(String, Value)>,
}

impl ParsedEnv {
    pub(crate) fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    /// Get a key's validated value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get a key's value as `T`.
    ///
    /// An undeclared key reads as `null`, so `Option<T>` yields `None`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, serde_json::Error> {
        let json = self
            .get(key)
            .map(Value::to_json)
            .unwrap_or(serde_json::Value::Null);
        serde_json::from_value(json)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The whole environment as a JSON object. Absent values are omitted.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .filter(|(_, v)| !v.is_undefined())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Deserialize the whole environment into a typed struct.
    ///
    /// # Example
    ///
    /// ```
    /// use preflight::prelude::*;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct App {
    ///     #[serde(rename = "PORT")]
    ///     port: u16,
    ///     #[serde(rename = "DEBUG")]
    ///     debug: Option<bool>,
    /// }
    ///
    /// let schema = EnvSchema::new()
    ///     .key("PORT", schema::number().int())
    ///     .key("DEBUG", schema::boolean().optional());
    /// let env = MockEnv::new().with_env("PORT", "8080");
    ///
    /// let app: App = parse_env(&schema, &env).unwrap().deserialize().unwrap();
    /// assert_eq!(app.port, 8080);
    /// assert_eq!(app.debug, None);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when the values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

impl<'a> IntoIterator for &'a ParsedEnv {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Builder for parsing an environment against a schema map.
///
/// # Example
///
/// ```
/// use preflight::prelude::*;
///
/// let schema = EnvSchema::new().detailed(
///     "LOG_LEVEL",
///     DetailedKey::new(schema::enumeration(["debug", "info", "warn"]))
///         .fallback_default("info")
///         .default_for("development", "debug"),
/// );
///
/// let env = MockEnv::new().with_env("RUST_ENV", "development");
/// let parsed = EnvParser::new(&schema)
///     .profile_key("RUST_ENV")
///     .parse(&env)
///     .unwrap();
/// assert_eq!(parsed.get_as::<String>("LOG_LEVEL").unwrap(), "debug");
/// ```
#[derive(Debug, Clone)]
pub struct EnvParser<'s> {
    schema: &'s EnvSchema,
    profile_key: String,
    profile: Option<String>,
    report: ReportOptions,
}

impl<'s> EnvParser<'s> {
    pub fn new(schema: &'s EnvSchema) -> Self {
        Self {
            schema,
            profile_key: DEFAULT_PROFILE_KEY.to_string(),
            profile: None,
            report: ReportOptions::default(),
        }
    }

    /// Read the active profile from this variable instead of `APP_ENV`.
    pub fn profile_key(mut self, key: impl Into<String>) -> Self {
        self.profile_key = key.into();
        self
    }

    /// Use this profile regardless of the environment.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Options for the failure report.
    pub fn report_options(mut self, options: ReportOptions) -> Self {
        self.report = options;
        self
    }

    /// Parse the process environment.
    pub fn parse_from_process(&self) -> Result<ParsedEnv, ParseEnvError> {
        self.parse(&RealEnv::new())
    }

    /// Parse `env`.
    ///
    /// # Errors
    ///
    /// - [`ParseEnvError::UnsupportedType`] when a declared schema has no
    ///   coercion.
    /// - [`ParseEnvError::Invalid`] with every failing key otherwise.
    pub fn parse(&self, env: &dyn EnvSource) -> Result<ParsedEnv, ParseEnvError> {
        let profile = self
            .profile
            .clone()
            .or_else(|| env.get_env(&self.profile_key));

        match parse_all(self.schema, env, profile.as_deref(), &EnvMessages)? {
            Validation::Success(entries) => Ok(ParsedEnv::new(entries)),
            Validation::Failure(errors) => Err(errors.with_options(self.report).into()),
        }
    }
}

/// Parse `env` against `schema`, taking the active profile from `APP_ENV`.
///
/// # Example
///
/// ```
/// use preflight::prelude::*;
///
/// let schema = EnvSchema::new()
///     .key("PORT", schema::number())
///     .key("DEBUG", schema::boolean().optional())
///     .detailed("STAGE", DetailedKey::new(schema::string()).fallback_default("dev"));
///
/// let env = MockEnv::new().with_env("PORT", "3000");
/// let parsed = parse_env(&schema, &env).unwrap();
///
/// assert_eq!(parsed.get("PORT"), Some(&Value::Number(3000.0)));
/// assert_eq!(parsed.get("DEBUG"), Some(&Value::Undefined));
/// assert_eq!(parsed.get("STAGE"), Some(&Value::from("dev")));
/// ```
pub fn parse_env(schema: &EnvSchema, env: &dyn EnvSource) -> Result<ParsedEnv, ParseEnvError> {
    EnvParser::new(schema).parse(env)
}
