// Allow large error types - per-key failure reports are expected
#![allow(clippy::result_large_err)]

//! Preflight: check your process environment before your app takes off.
//!
//! Preflight reads a flat dictionary of environment strings, coerces each
//! declared key into the type its schema expects, validates it, and either
//! returns a read-only [`ParsedEnv`] or one report listing every key that
//! failed. It uses stillwater's `Validation` for error accumulation, so a
//! single run surfaces all problems at once.
//!
//! # Core Concepts
//!
//! - **Type-directed coercion**: `"3000"` becomes a number, `"yes"` a boolean,
//!   `'{"a":1}'` an object, all driven by the schema
//! - **Profile defaults**: per-key defaults chosen by `APP_ENV` (or any key)
//! - **Error accumulation**: every failing key in one report, never fail-fast
//! - **Testable I/O**: dependency injection via the [`EnvSource`] trait
//!
//! # Quick Start
//!
//! ```
//! use preflight::prelude::*;
//!
//! let schema = EnvSchema::new()
//!     .key("PORT", schema::number().int().positive())
//!     .key("DEBUG", schema::boolean().optional())
//!     .detailed(
//!         "STAGE",
//!         DetailedKey::new(schema::enumeration(["dev", "staging", "prod"]))
//!             .description("deployment stage")
//!             .fallback_default("dev")
//!             .default_for("production", "prod"),
//!     );
//!
//! let env = MockEnv::new()
//!     .with_env("PORT", "3000")
//!     .with_env("APP_ENV", "production");
//!
//! let parsed = parse_env(&schema, &env).unwrap();
//! assert_eq!(parsed.get_as::<u16>("PORT").unwrap(), 3000);
//! assert_eq!(parsed.get_as::<Option<bool>>("DEBUG").unwrap(), None);
//! assert_eq!(parsed.get_as::<String>("STAGE").unwrap(), "prod");
//! ```
//!
//! When anything fails, the error's `Display` is the whole report:
//!
//! ```
//! use preflight::prelude::*;
//!
//! let schema = EnvSchema::new()
//!     .key("PORT", schema::number())
//!     .key("FEATURES", schema::record(schema::boolean()));
//! let env = MockEnv::new().with_env("FEATURES", "{bad json");
//!
//! let report = parse_env(&schema, &env).unwrap_err().to_string();
//! assert!(report.starts_with("Errors found while parsing environment:\n[PORT]:\n"));
//! assert!(report.contains("[FEATURES]:\n  malformed structured value"));
//! ```
//!
//! # Architecture
//!
//! Preflight follows the "pure core, imperative shell" pattern:
//!
//! - **Pure Core**: coercion, default resolution, validation and reporting
//!   are pure functions of the schema map and the dictionary
//! - **Imperative Shell**: reading the environment goes through [`EnvSource`]
//!
//! # Module Structure
//!
//! - [`prelude`]: Convenient re-exports for common usage
//! - [`config`]: [`parse_env`], [`EnvParser`] and [`ParsedEnv`]
//! - [`env_schema`]: [`EnvSchema`], the ordered schema map
//! - [`schema`]: schema descriptors and their builders
//! - [`coerce`]: coercer synthesis from schema descriptors
//! - [`defaults`]: per-profile default resolution
//! - [`parser`]: per-key parsing and aggregation
//! - [`validate`]: structural validation with injected messages
//! - [`report`]: rendering of the failure report
//! - [`error`]: error types
//! - [`value`]: the dynamic [`Value`]
//! - [`mod@env`]: [`EnvSource`] and [`MockEnv`] for testing
//!
//! # Stillwater Integration
//!
//! | Type | Usage |
//! |------|-------|
//! | `Validation<T, E>` | Accumulating per-key and per-member failures |
//! | `NonEmptyVec<T>` | Guaranteed non-empty failure lists |
//! | `Semigroup` | Combining failures from independent keys |

pub mod coerce;
pub mod config;
pub mod defaults;
pub mod env;
pub mod env_schema;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod report;
pub mod schema;
pub mod validate;
pub mod value;

// Re-exports for convenience
pub use coerce::{synthesize, Coercer};
pub use config::{parse_env, EnvParser, ParsedEnv, DEFAULT_PROFILE_KEY};
pub use defaults::{resolve_default, ProfileDefaults, FALLBACK_PROFILE};
pub use env::{EnvSource, MockEnv, RealEnv};
pub use env_schema::{DetailedKey, EnvSchema, KeySchema};
pub use error::{
    CoercionError, EnvErrors, Issue, IssueCode, KeyError, KeyFailure, ParseEnvError,
    SchemaValidation, UnsupportedReason, UnsupportedTypeError, ValidationErrors,
};
pub use parser::{parse_key, KeyOutcome};
pub use report::{render_report, ColorOption, ParseResultExt, ReportOptions};
pub use schema::{Schema, SchemaExt, TypeDescriptor, TypeTag};
pub use validate::{validate, DefaultMessages, EnvMessages, MessageMap};
pub use value::Value;

// Re-export stillwater types that are commonly used
pub use stillwater::{NonEmptyVec, Semigroup, Validation};
