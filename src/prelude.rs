//! Convenient re-exports for common preflight usage.
//!
//! # Quick Start
//!
//! ```
//! use preflight::prelude::*;
//!
//! let schema = EnvSchema::new()
//!     .key("DATABASE_URL", schema::string().url())
//!     .key("POOL_SIZE", schema::number().int().min(1.0).default_value(10));
//!
//! let env = MockEnv::new().with_env("DATABASE_URL", "postgres://db:5432/app");
//! let parsed = parse_env(&schema, &env).unwrap();
//! assert_eq!(parsed.get_as::<u32>("POOL_SIZE").unwrap(), 10);
//! ```
//!
//! The `schema` module is re-exported whole so builders read as
//! `schema::number()`, `schema::object([...])` and so on.

// ============================================================================
// Stillwater re-exports (core functional programming types)
// ============================================================================

/// Result type with error accumulation.
///
/// # Example
///
/// ```
/// use preflight::prelude::*;
///
/// let v1: Validation<i32, ValidationErrors> = Validation::Success(1);
/// let v2: Validation<i32, ValidationErrors> = Validation::Success(2);
/// let all = Validation::all_vec(vec![v1, v2]);
/// assert!(all.is_success());
/// ```
pub use stillwater::Validation;

/// Trait for combining values associatively (used for error accumulation).
pub use stillwater::Semigroup;

/// Non-empty vector type (guarantees at least one element).
pub use stillwater::NonEmptyVec;

// ============================================================================
// Entry points
// ============================================================================

pub use crate::config::parse_env;

pub use crate::config::EnvParser;

pub use crate::config::ParsedEnv;

// ============================================================================
// Schema map and schemas
// ============================================================================

pub use crate::env_schema::EnvSchema;

pub use crate::env_schema::DetailedKey;

pub use crate::env_schema::KeySchema;

pub use crate::defaults::ProfileDefaults;

pub use crate::schema;

pub use crate::schema::Schema;

pub use crate::schema::SchemaExt;

pub use crate::value::Value;

// ============================================================================
// Environment abstractions
// ============================================================================

pub use crate::env::EnvSource;

pub use crate::env::RealEnv;

pub use crate::env::MockEnv;

// ============================================================================
// Error types and reporting
// ============================================================================

pub use crate::error::ParseEnvError;

pub use crate::error::EnvErrors;

pub use crate::error::KeyFailure;

pub use crate::error::ValidationErrors;

pub use crate::error::UnsupportedTypeError;

pub use crate::report::ReportOptions;

pub use crate::report::ColorOption;

pub use crate::report::ParseResultExt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_validation_all_vec_accumulates_errors() {
        use crate::error::{Issue, IssueCode};

        let issue = |m: &str| Issue {
            path: vec![],
            code: IssueCode::Custom {
                message: m.to_string(),
            },
            message: m.to_string(),
        };
        let v1: Validation<i32, ValidationErrors> =
            Validation::Failure(ValidationErrors::single(issue("a")));
        let v2: Validation<i32, ValidationErrors> =
            Validation::Failure(ValidationErrors::single(issue("b")));

        match Validation::all_vec(vec![v1, v2]) {
            Validation::Failure(errors) => assert_eq!(errors.len(), 2),
            Validation::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_prelude_builds_and_parses() {
        let schema = EnvSchema::new()
            .key("NAME", schema::string().min_length(1))
            .key("RETRIES", schema::number().int().optional());
        let env = MockEnv::new().with_env("NAME", "svc");

        let parsed = parse_env(&schema, &env).unwrap();
        assert_eq!(parsed.get("NAME"), Some(&Value::from("svc")));
        assert_eq!(parsed.get("RETRIES"), Some(&Value::Undefined));
    }
}
