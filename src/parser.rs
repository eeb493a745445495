//! Per-key parsing.
//!
//! For every declared key the parser fetches the raw value, decides whether a
//! default applies, coerces, validates and records exactly one
//! [`KeyOutcome`]. Per-key failures are collected and never stop the run.
//! Only [`UnsupportedTypeError`] escapes early, since it means the schema map
//! itself is wrong.

use stillwater::Validation;
use tracing::{debug, warn};

use crate::coerce::synthesize;
use crate::defaults::resolve_default;
use crate::env::EnvSource;
use crate::env_schema::{EnvSchema, KeySchema};
use crate::error::{EnvErrors, KeyError, KeyFailure, UnsupportedTypeError};
use crate::schema::{Schema, TypeDescriptor};
use crate::validate::{validate, MessageMap};
use crate::value::Value;

/// The result of parsing one key.
#[derive(Debug, Clone)]
pub enum KeyOutcome {
    Success(Value),
    Failure(KeyFailure),
}

impl KeyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, KeyOutcome::Success(_))
    }
}

/// Which value is fed to the coercer, and which schema checks it.
struct Input<'a> {
    value: Value,
    schema: &'a Schema,
    default_value: Option<Value>,
}

/// Parse one key.
///
/// `raw` is the environment's value, `None` when absent. A wrapper-level
/// default on the schema takes precedence over per-profile defaults; its
/// thunk is called at most once and the value it returned is the value that
/// is validated and reported.
///
/// # Errors
///
/// Returns [`UnsupportedTypeError`] when the schema has no coercion. No
/// default is evaluated in that case.
pub fn parse_key(
    key: &str,
    declaration: &KeySchema,
    raw: Option<&str>,
    profile: Option<&str>,
    messages: &dyn MessageMap,
) -> Result<KeyOutcome, UnsupportedTypeError> {
    let schema = declaration.schema();
    let coercer = synthesize(schema)?;

    let input = match (raw, schema.descriptor()) {
        (None, TypeDescriptor::Default(inner, thunk)) => {
            let value = thunk();
            Input {
                value: value.clone(),
                schema: inner,
                default_value: Some(value),
            }
        }
        (None, _) => match resolve_default(declaration.profile_defaults(), profile) {
            Some(value) => Input {
                value: value.clone(),
                schema,
                default_value: Some(value),
            },
            None => Input {
                value: Value::Undefined,
                schema,
                default_value: None,
            },
        },
        (Some(raw), _) => Input {
            value: Value::from(raw),
            schema,
            default_value: None,
        },
    };

    let result = coercer(input.value)
        .map_err(KeyError::from)
        .and_then(|coerced| validate(input.schema, coerced, messages).map_err(KeyError::from));

    debug!(
        key = key,
        present = raw.is_some(),
        used_default = input.default_value.is_some(),
        outcome = match &result {
            Ok(_) => "success",
            Err(KeyError::Coercion(_)) => "coercion_error",
            Err(KeyError::Validation(_)) => "validation_error",
        },
        "parsed environment key"
    );

    Ok(match result {
        Ok(value) => KeyOutcome::Success(value),
        Err(error) => KeyOutcome::Failure(KeyFailure {
            key: key.to_string(),
            raw_value: raw.map(str::to_string),
            used_default: input.default_value.is_some(),
            default_value: input.default_value,
            description: declaration.description().map(str::to_string),
            error,
        }),
    })
}

/// Parse every key in declaration order.
///
/// Succeeds with `(key, value)` pairs in declaration order, or fails with
/// every key failure. A key whose validated value is absent is still present
/// in the output as [`Value::Undefined`].
///
/// # Errors
///
/// Returns [`UnsupportedTypeError`] for the first key whose schema cannot
/// be coerced. Keys declared before it have already been parsed.
pub fn parse_all(
    schema: &EnvSchema,
    env: &dyn EnvSource,
    profile: Option<&str>,
    messages: &dyn MessageMap,
) -> Result<Validation<Vec<(String, Value)>, EnvErrors>, UnsupportedTypeError> {
    let mut outcomes = Vec::with_capacity(schema.len());

    for (key, declaration) in schema.iter() {
        let raw = env.get_env(key);
        let outcome = parse_key(key, declaration, raw.as_deref(), profile, messages)?;
        outcomes.push(match outcome {
            KeyOutcome::Success(value) => Validation::Success((key.to_string(), value)),
            KeyOutcome::Failure(failure) => Validation::Failure(EnvErrors::single(failure)),
        });
    }

    let result = Validation::all_vec(outcomes);
    if let Validation::Failure(errors) = &result {
        warn!(
            failures = errors.len(),
            keys = schema.len(),
            "environment failed validation"
        );
    }
    Ok(result)
}
