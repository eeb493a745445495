//! Coercion of raw environment strings.
//!
//! [`synthesize`] walks a schema once and returns a [`Coercer`]: a function
//! that reshapes a raw value into what the schema's leaf type expects. A
//! coercer never validates. When a string does not look like the expected
//! type it is passed through unchanged so the validator can reject it with
//! its own message. Structured types are the one exception: a string that is
//! not valid JSON fails with [`CoercionError`].
//!
//! Coercers take a [`Value`] rather than a raw string so the same function
//! can reshape typed defaults. Anything that is not a string is left alone
//! unless noted.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::error::{CoercionError, UnsupportedReason, UnsupportedTypeError};
use crate::schema::{Literal, Schema, TypeDescriptor};
use crate::value::Value;

/// A best-effort conversion from a raw value to the shape a schema expects.
pub type Coercer = Box<dyn Fn(Value) -> Result<Value, CoercionError> + Send + Sync>;

/// Build the coercer for `schema`.
///
/// Wrapper nodes are unwrapped here, so an unsupported tag anywhere on the
/// wrapper chain fails now rather than when a value arrives. Members of
/// structured types are not inspected: the whole value is parsed as JSON.
///
/// # Errors
///
/// Returns [`UnsupportedTypeError`] naming the first tag that has no coercion.
pub fn synthesize(schema: &Schema) -> Result<Coercer, UnsupportedTypeError> {
    match schema.descriptor() {
        TypeDescriptor::String(_) | TypeDescriptor::Enum(_) | TypeDescriptor::Undefined => {
            Ok(Box::new(identity))
        }
        TypeDescriptor::Number(_) => Ok(infallible(coerce_number)),
        TypeDescriptor::BigInt(_) => Ok(infallible(coerce_bigint)),
        TypeDescriptor::Boolean => Ok(infallible(coerce_boolean)),
        TypeDescriptor::Array(_, _)
        | TypeDescriptor::Object(_)
        | TypeDescriptor::Tuple(_)
        | TypeDescriptor::Record(_)
        | TypeDescriptor::Intersection(_, _) => Ok(Box::new(coerce_structured)),
        TypeDescriptor::Effects(inner, _) | TypeDescriptor::Default(inner, _) => synthesize(inner),
        TypeDescriptor::Optional(inner) => {
            let inner = synthesize(inner)?;
            Ok(Box::new(move |v: Value| match v {
                Value::Undefined => Ok(Value::Undefined),
                other => inner(other),
            }))
        }
        TypeDescriptor::Nullable(inner) => {
            let inner = synthesize(inner)?;
            Ok(Box::new(move |v: Value| {
                if v.is_nullish() {
                    Ok(Value::Null)
                } else {
                    inner(v)
                }
            }))
        }
        TypeDescriptor::Date => Ok(infallible(coerce_date)),
        TypeDescriptor::Literal(literal) => Ok(match literal {
            Literal::Number(_) => infallible(coerce_number),
            Literal::Bool(_) => infallible(coerce_boolean),
            Literal::String(_) | Literal::BigInt(_) | Literal::Null | Literal::Undefined => {
                Box::new(identity)
            }
        }),
        TypeDescriptor::Null => Ok(infallible(coerce_null)),
        TypeDescriptor::NativeEnum(_)
        | TypeDescriptor::Void
        | TypeDescriptor::Never
        | TypeDescriptor::Function
        | TypeDescriptor::Promise(_)
        | TypeDescriptor::Map(_, _)
        | TypeDescriptor::Set(_)
        | TypeDescriptor::Branded(_)
        | TypeDescriptor::Catch(_, _)
        | TypeDescriptor::NaN
        | TypeDescriptor::Pipeline(_, _)
        | TypeDescriptor::Union(_)
        | TypeDescriptor::DiscriminatedUnion(_, _) => Err(UnsupportedTypeError::new(
            schema.tag(),
            UnsupportedReason::NotImplemented,
        )),
        TypeDescriptor::Any | TypeDescriptor::Unknown => Err(UnsupportedTypeError::new(
            schema.tag(),
            UnsupportedReason::TooBroad,
        )),
    }
}

fn identity(value: Value) -> Result<Value, CoercionError> {
    Ok(value)
}

fn infallible(f: fn(Value) -> Value) -> Coercer {
    Box::new(move |v: Value| -> Result<Value, CoercionError> { Ok(f(v)) })
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("number pattern is valid"))
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern is valid"))
}

/// Strict decimal strings become numbers. Strings too long to fit a finite
/// `f64` are left unchanged.
pub fn coerce_number(value: Value) -> Value {
    match value {
        Value::String(s) if number_pattern().is_match(&s) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::String(s),
        },
        other => other,
    }
}

/// Integer strings become big integers. Strings outside the `i128` range are
/// left unchanged.
pub fn coerce_bigint(value: Value) -> Value {
    match value {
        Value::String(s) if integer_pattern().is_match(&s) => match s.parse::<i128>() {
            Ok(i) => Value::BigInt(i),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

/// Absence becomes explicit null.
pub fn coerce_null(value: Value) -> Value {
    if value.is_nullish() {
        Value::Null
    } else {
        value
    }
}

/// Exact lowercase spellings become booleans. Anything else is unchanged.
pub fn coerce_boolean(value: Value) -> Value {
    match value {
        Value::String(s) => match s.as_str() {
            "true" | "yes" | "1" => Value::Bool(true),
            "false" | "no" | "0" => Value::Bool(false),
            _ => Value::String(s),
        },
        other => other,
    }
}

/// Non-empty strings are parsed as JSON.
///
/// The empty string reads as absence, so the validator reports it as
/// missing rather than malformed.
pub fn coerce_structured(value: Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(s) if s.is_empty() => Ok(Value::Undefined),
        Value::String(s) => serde_json::from_str::<serde_json::Value>(&s)
            .map(Value::from)
            .map_err(|e| CoercionError::malformed(&e)),
        other => Ok(other),
    }
}

/// Strings become dates, or [`Value::InvalidDate`] when unparsable. Numbers
/// are read as milliseconds since the Unix epoch.
pub fn coerce_date(value: Value) -> Value {
    match value {
        Value::String(s) => parse_date(&s),
        Value::Number(ms) if ms.is_finite() && ms.fract() == 0.0 => {
            DateTime::from_timestamp_millis(ms as i64)
                .map(Value::Date)
                .unwrap_or(Value::InvalidDate)
        }
        Value::Number(_) => Value::InvalidDate,
        other => other,
    }
}

/// Accepts RFC 3339, RFC 2822, a zone-less ISO date-time (read as UTC) and a
/// bare `YYYY-MM-DD` date (midnight UTC).
fn parse_date(s: &str) -> Value {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Value::Date(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc2822(s) {
        return Value::Date(d.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Value::Date(naive.and_utc());
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Value::Date(naive.and_utc()))
            .unwrap_or(Value::InvalidDate),
        Err(_) => Value::InvalidDate,
    }
}
