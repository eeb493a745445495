//! Schema validation.
//!
//! [`validate`] checks a [`Value`] against a [`Schema`] and either returns the
//! (possibly transformed) value or every [`Issue`] it found. Issue messages
//! come from an explicitly supplied [`MessageMap`]; there is no global
//! formatter that another call site could have replaced.

use std::sync::OnceLock;

use regex::Regex;
use stillwater::Validation;

use crate::error::{
    Bound, Issue, IssueCode, PathSegment, SchemaValidation, SizeKind, StringFormat,
    ValidationErrors,
};
use crate::schema::{
    ArrayCheck, BigIntCheck, Effect, Literal, NumberCheck, Schema, StringCheck, TypeDescriptor,
};
use crate::value::Value;

/// Phrases issues.
///
/// `default_message` is the library's own wording for `code`; return it to
/// keep that wording.
pub trait MessageMap {
    fn message(&self, code: &IssueCode, default_message: &str) -> String;
}

impl<F> MessageMap for F
where
    F: Fn(&IssueCode, &str) -> String,
{
    fn message(&self, code: &IssueCode, default_message: &str) -> String {
        self(code, default_message)
    }
}

/// The library's default wording, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageMap for DefaultMessages {
    fn message(&self, _code: &IssueCode, default_message: &str) -> String {
        default_message.to_string()
    }
}

/// Default wording, except that a missing value reads as
/// "This field is required."
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMessages;

/// Message used for a value that was required but absent.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

impl MessageMap for EnvMessages {
    fn message(&self, code: &IssueCode, default_message: &str) -> String {
        match code {
            IssueCode::InvalidType { received, .. } if *received == "undefined" => {
                REQUIRED_MESSAGE.to_string()
            }
            _ => default_message.to_string(),
        }
    }
}

/// Validate `value` against `schema`, phrasing issues with `messages`.
pub fn validate(
    schema: &Schema,
    value: Value,
    messages: &dyn MessageMap,
) -> Result<Value, ValidationErrors> {
    let validator = Validator { messages };
    match validator.check(schema, value, &[]) {
        Validation::Success(v) => Ok(v),
        Validation::Failure(errors) => Err(errors),
    }
}

struct Validator<'a> {
    messages: &'a dyn MessageMap,
}

impl Validator<'_> {
    fn issue(&self, path: &[PathSegment], code: IssueCode) -> Issue {
        let message = self.messages.message(&code, &code.default_message());
        Issue {
            path: path.to_vec(),
            code,
            message,
        }
    }

    fn fail<T>(&self, path: &[PathSegment], code: IssueCode) -> SchemaValidation<T> {
        Validation::Failure(ValidationErrors::single(self.issue(path, code)))
    }

    fn invalid_type<T>(
        &self,
        path: &[PathSegment],
        expected: impl Into<String>,
        value: &Value,
    ) -> SchemaValidation<T> {
        self.fail(
            path,
            IssueCode::InvalidType {
                expected: expected.into(),
                received: value.type_name(),
            },
        )
    }

    /// Succeed with `value` unless `issues` is non-empty.
    fn finish(&self, value: Value, issues: Vec<Issue>) -> SchemaValidation<Value> {
        match ValidationErrors::from_vec(issues) {
            None => Validation::Success(value),
            Some(errors) => Validation::Failure(errors),
        }
    }

    fn check(&self, schema: &Schema, value: Value, path: &[PathSegment]) -> SchemaValidation<Value> {
        match schema.descriptor() {
            TypeDescriptor::String(checks) => match value {
                Value::String(s) => {
                    let issues = self.string_issues(&s, checks, path);
                    self.finish(Value::String(s), issues)
                }
                other => self.invalid_type(path, "string", &other),
            },
            TypeDescriptor::Number(checks) => match value {
                Value::Number(n) if n.is_infinite() => self.fail(path, IssueCode::NotFinite),
                Value::Number(n) if !n.is_nan() => {
                    let issues = self.number_issues(n, checks, path);
                    self.finish(Value::Number(n), issues)
                }
                other => self.invalid_type(path, "number", &other),
            },
            TypeDescriptor::BigInt(checks) => match value {
                Value::BigInt(i) => {
                    let issues = self.bigint_issues(i, checks, path);
                    self.finish(Value::BigInt(i), issues)
                }
                other => self.invalid_type(path, "bigint", &other),
            },
            TypeDescriptor::Boolean => match value {
                Value::Bool(b) => Validation::Success(Value::Bool(b)),
                other => self.invalid_type(path, "boolean", &other),
            },
            TypeDescriptor::Enum(options) => match value {
                Value::String(s) if options.contains(&s) => Validation::Success(Value::String(s)),
                Value::String(s) => self.fail(
                    path,
                    IssueCode::InvalidEnumValue {
                        options: options.clone(),
                        received: s,
                    },
                ),
                other => self.invalid_type(path, quoted_options(options), &other),
            },
            TypeDescriptor::NativeEnum(members) => {
                if members.iter().any(|m| m.to_value() == value) {
                    Validation::Success(value)
                } else {
                    let options: Vec<String> = members.iter().map(Literal::option_name).collect();
                    self.fail(
                        path,
                        IssueCode::InvalidEnumValue {
                            options,
                            received: received_name(&value),
                        },
                    )
                }
            }
            TypeDescriptor::Literal(literal) => {
                if literal.to_value() == value {
                    Validation::Success(value)
                } else {
                    self.fail(
                        path,
                        IssueCode::InvalidLiteral {
                            expected: literal.clone(),
                        },
                    )
                }
            }
            TypeDescriptor::Date => match value {
                Value::Date(d) => Validation::Success(Value::Date(d)),
                Value::InvalidDate => self.fail(path, IssueCode::InvalidDate),
                other => self.invalid_type(path, "date", &other),
            },
            TypeDescriptor::Null => match value {
                Value::Null => Validation::Success(Value::Null),
                other => self.invalid_type(path, "null", &other),
            },
            TypeDescriptor::Undefined => match value {
                Value::Undefined => Validation::Success(Value::Undefined),
                other => self.invalid_type(path, "undefined", &other),
            },
            TypeDescriptor::Void => match value {
                Value::Undefined => Validation::Success(Value::Undefined),
                other => self.invalid_type(path, "void", &other),
            },
            TypeDescriptor::Never => self.invalid_type(path, "never", &value),
            // none of these can be represented by a Value
            TypeDescriptor::Function => self.invalid_type(path, "function", &value),
            TypeDescriptor::Promise(_) => self.invalid_type(path, "promise", &value),
            TypeDescriptor::Map(_, _) => self.invalid_type(path, "map", &value),
            TypeDescriptor::Set(_) => self.invalid_type(path, "set", &value),
            TypeDescriptor::Branded(inner) => self.check(inner, value, path),
            TypeDescriptor::Catch(inner, fallback) => match self.check(inner, value, path) {
                Validation::Success(v) => Validation::Success(v),
                Validation::Failure(_) => Validation::Success(fallback.clone()),
            },
            TypeDescriptor::NaN => match value {
                Value::Number(n) if n.is_nan() => Validation::Success(Value::Number(n)),
                other => self.invalid_type(path, "nan", &other),
            },
            TypeDescriptor::Pipeline(first, second) => match self.check(first, value, path) {
                Validation::Success(v) => self.check(second, v, path),
                failure => failure,
            },
            TypeDescriptor::Array(element, checks) => match value {
                Value::Array(items) => {
                    let mut size_issues = Vec::new();
                    for check in checks {
                        if let Some(issue) = self.array_issue(items.len(), check, path) {
                            size_issues.push(issue);
                        }
                    }
                    let elements = self.check_elements(items, |_| Some(element.as_ref()), path);
                    self.combine_sized(elements.map(Value::Array), size_issues)
                }
                other => self.invalid_type(path, "array", &other),
            },
            TypeDescriptor::Object(fields) => match value {
                Value::Object(mut members) => {
                    let results: Vec<SchemaValidation<(String, Value)>> = fields
                        .iter()
                        .map(|(name, field)| {
                            let member = members.remove(name).unwrap_or_default();
                            let child = child_path(path, PathSegment::Key(name.clone()));
                            let name = name.clone();
                            self.check(field, member, &child).map(move |v| (name, v))
                        })
                        .collect();
                    Validation::all_vec(results).map(|pairs| {
                        Value::Object(
                            pairs
                                .into_iter()
                                .filter(|(_, v)| !v.is_undefined())
                                .collect(),
                        )
                    })
                }
                other => self.invalid_type(path, "object", &other),
            },
            TypeDescriptor::Tuple(items) => match value {
                Value::Array(values) => {
                    let len = values.len();
                    let mut size_issues = Vec::new();
                    if len < items.len() {
                        size_issues.push(self.issue(
                            path,
                            IssueCode::TooSmall {
                                kind: SizeKind::Array,
                                minimum: Bound::Count(items.len()),
                                inclusive: true,
                                exact: false,
                            },
                        ));
                    } else if len > items.len() {
                        size_issues.push(self.issue(
                            path,
                            IssueCode::TooBig {
                                kind: SizeKind::Array,
                                maximum: Bound::Count(items.len()),
                                inclusive: true,
                                exact: false,
                            },
                        ));
                    }
                    if !size_issues.is_empty() {
                        return self.finish(Value::Undefined, size_issues);
                    }
                    let checked = self.check_elements(values, |i| items.get(i), path);
                    checked.map(Value::Array)
                }
                other => self.invalid_type(path, "array", &other),
            },
            TypeDescriptor::Record(element) => match value {
                Value::Object(members) => {
                    let results: Vec<SchemaValidation<(String, Value)>> = members
                        .into_iter()
                        .map(|(name, member)| {
                            let child = child_path(path, PathSegment::Key(name.clone()));
                            self.check(element, member, &child).map(move |v| (name, v))
                        })
                        .collect();
                    Validation::all_vec(results)
                        .map(|pairs| Value::Object(pairs.into_iter().collect()))
                }
                other => self.invalid_type(path, "object", &other),
            },
            TypeDescriptor::Intersection(left, right) => {
                let l = self.check(left, value.clone(), path);
                let r = self.check(right, value, path);
                match Validation::all_vec(vec![l, r]) {
                    Validation::Success(mut both) => {
                        let right_value = both.pop().unwrap_or_default();
                        let left_value = both.pop().unwrap_or_default();
                        match merge_values(left_value, right_value) {
                            Some(merged) => Validation::Success(merged),
                            None => self.fail(path, IssueCode::InvalidIntersectionTypes),
                        }
                    }
                    Validation::Failure(errors) => Validation::Failure(errors),
                }
            }
            TypeDescriptor::Optional(inner) => match value {
                Value::Undefined => Validation::Success(Value::Undefined),
                other => self.check(inner, other, path),
            },
            TypeDescriptor::Nullable(inner) => match value {
                Value::Null => Validation::Success(Value::Null),
                other => self.check(inner, other, path),
            },
            TypeDescriptor::Default(inner, default_fn) => match value {
                Value::Undefined => self.check(inner, default_fn(), path),
                other => self.check(inner, other, path),
            },
            TypeDescriptor::Effects(inner, effect) => match effect {
                Effect::Preprocess(f) => self.check(inner, f(value), path),
                Effect::Transform(f) => match self.check(inner, value, path) {
                    Validation::Success(v) => match f(v) {
                        Ok(out) => Validation::Success(out),
                        Err(message) => self.fail(path, IssueCode::Custom { message }),
                    },
                    failure => failure,
                },
                Effect::Refine(predicate, message) => match self.check(inner, value, path) {
                    Validation::Success(v) if predicate(&v) => Validation::Success(v),
                    Validation::Success(_) => self.fail(
                        path,
                        IssueCode::Custom {
                            message: message.clone(),
                        },
                    ),
                    failure => failure,
                },
            },
            TypeDescriptor::Union(options) => {
                for option in options {
                    if let Validation::Success(v) = self.check(option, value.clone(), path) {
                        return Validation::Success(v);
                    }
                }
                self.fail(path, IssueCode::InvalidUnion)
            }
            TypeDescriptor::DiscriminatedUnion(discriminator, options) => {
                let tag = value
                    .as_object()
                    .and_then(|obj| obj.get(discriminator))
                    .cloned()
                    .unwrap_or_default();
                let chosen = options
                    .iter()
                    .find(|option| discriminator_literal(option, discriminator).as_ref() == Some(&tag));
                match chosen {
                    Some(option) => self.check(option, value, path),
                    None => {
                        let options = options
                            .iter()
                            .filter_map(|o| discriminator_literal(o, discriminator))
                            .map(|v| received_name(&v))
                            .collect();
                        let child = child_path(path, PathSegment::Key(discriminator.clone()));
                        self.fail(&child, IssueCode::InvalidUnionDiscriminator { options })
                    }
                }
            }
            TypeDescriptor::Any | TypeDescriptor::Unknown => Validation::Success(value),
        }
    }

    fn check_elements<'s>(
        &self,
        items: Vec<Value>,
        schema_for: impl Fn(usize) -> Option<&'s Schema>,
        path: &[PathSegment],
    ) -> SchemaValidation<Vec<Value>> {
        let results: Vec<SchemaValidation<Value>> = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match schema_for(i) {
                Some(schema) => self.check(schema, item, &child_path(path, PathSegment::Index(i))),
                None => Validation::Success(item),
            })
            .collect();
        Validation::all_vec(results)
    }

    fn combine_sized(
        &self,
        checked: SchemaValidation<Value>,
        size_issues: Vec<Issue>,
    ) -> SchemaValidation<Value> {
        match (checked, ValidationErrors::from_vec(size_issues)) {
            (checked, None) => checked,
            (Validation::Success(_), Some(size)) => Validation::Failure(size),
            (Validation::Failure(errors), Some(size)) => {
                Validation::all_vec(vec![
                    Validation::<Value, ValidationErrors>::Failure(size),
                    Validation::Failure(errors),
                ])
                .map(|_| Value::Undefined)
            }
        }
    }

    fn string_issues(&self, s: &str, checks: &[StringCheck], path: &[PathSegment]) -> Vec<Issue> {
        let len = s.chars().count();
        let mut issues = Vec::new();
        for check in checks {
            let code = match check {
                StringCheck::MinLength(n) if len < *n => Some(IssueCode::TooSmall {
                    kind: SizeKind::String,
                    minimum: Bound::Count(*n),
                    inclusive: true,
                    exact: false,
                }),
                StringCheck::MaxLength(n) if len > *n => Some(IssueCode::TooBig {
                    kind: SizeKind::String,
                    maximum: Bound::Count(*n),
                    inclusive: true,
                    exact: false,
                }),
                StringCheck::Length(n) if len < *n => Some(IssueCode::TooSmall {
                    kind: SizeKind::String,
                    minimum: Bound::Count(*n),
                    inclusive: true,
                    exact: true,
                }),
                StringCheck::Length(n) if len > *n => Some(IssueCode::TooBig {
                    kind: SizeKind::String,
                    maximum: Bound::Count(*n),
                    inclusive: true,
                    exact: true,
                }),
                StringCheck::Email if !email_pattern().is_match(s) => {
                    Some(IssueCode::InvalidString {
                        format: StringFormat::Email,
                    })
                }
                StringCheck::Url if !url_pattern().is_match(s) => Some(IssueCode::InvalidString {
                    format: StringFormat::Url,
                }),
                StringCheck::Regex(re) if !re.is_match(s) => Some(IssueCode::InvalidString {
                    format: StringFormat::Regex,
                }),
                StringCheck::StartsWith(prefix) if !s.starts_with(prefix.as_str()) => {
                    Some(IssueCode::InvalidString {
                        format: StringFormat::StartsWith(prefix.clone()),
                    })
                }
                StringCheck::EndsWith(suffix) if !s.ends_with(suffix.as_str()) => {
                    Some(IssueCode::InvalidString {
                        format: StringFormat::EndsWith(suffix.clone()),
                    })
                }
                _ => None,
            };
            if let Some(code) = code {
                issues.push(self.issue(path, code));
            }
        }
        issues
    }

    fn number_issues(&self, n: f64, checks: &[NumberCheck], path: &[PathSegment]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for check in checks {
            let code = match check {
                NumberCheck::Min(min) if n < *min => Some(too_small_number(*min, true)),
                NumberCheck::Gt(min) if n <= *min => Some(too_small_number(*min, false)),
                NumberCheck::Max(max) if n > *max => Some(too_big_number(*max, true)),
                NumberCheck::Lt(max) if n >= *max => Some(too_big_number(*max, false)),
                NumberCheck::Int if n.fract() != 0.0 || !n.is_finite() => {
                    Some(IssueCode::InvalidType {
                        expected: "integer".to_string(),
                        received: "float",
                    })
                }
                _ => None,
            };
            if let Some(code) = code {
                issues.push(self.issue(path, code));
            }
        }
        issues
    }

    fn bigint_issues(&self, i: i128, checks: &[BigIntCheck], path: &[PathSegment]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for check in checks {
            let code = match check {
                BigIntCheck::Min(min) if i < *min => Some(IssueCode::TooSmall {
                    kind: SizeKind::BigInt,
                    minimum: Bound::BigInt(*min),
                    inclusive: true,
                    exact: false,
                }),
                BigIntCheck::Max(max) if i > *max => Some(IssueCode::TooBig {
                    kind: SizeKind::BigInt,
                    maximum: Bound::BigInt(*max),
                    inclusive: true,
                    exact: false,
                }),
                _ => None,
            };
            if let Some(code) = code {
                issues.push(self.issue(path, code));
            }
        }
        issues
    }

    fn array_issue(&self, len: usize, check: &ArrayCheck, path: &[PathSegment]) -> Option<Issue> {
        let code = match check {
            ArrayCheck::MinLength(n) if len < *n => IssueCode::TooSmall {
                kind: SizeKind::Array,
                minimum: Bound::Count(*n),
                inclusive: true,
                exact: false,
            },
            ArrayCheck::MaxLength(n) if len > *n => IssueCode::TooBig {
                kind: SizeKind::Array,
                maximum: Bound::Count(*n),
                inclusive: true,
                exact: false,
            },
            _ => return None,
        };
        Some(self.issue(path, code))
    }
}

fn too_small_number(min: f64, inclusive: bool) -> IssueCode {
    IssueCode::TooSmall {
        kind: SizeKind::Number,
        minimum: Bound::Number(min),
        inclusive,
        exact: false,
    }
}

fn too_big_number(max: f64, inclusive: bool) -> IssueCode {
    IssueCode::TooBig {
        kind: SizeKind::Number,
        maximum: Bound::Number(max),
        inclusive,
        exact: false,
    }
}

fn child_path(path: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut child = path.to_vec();
    child.push(segment);
    child
}

fn quoted_options(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("'{}'", o))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn received_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The value an option's discriminator member must equal, if it is an
/// object schema with a literal discriminator.
fn discriminator_literal(option: &Schema, discriminator: &str) -> Option<Value> {
    match option.descriptor() {
        TypeDescriptor::Object(fields) => fields
            .iter()
            .find(|(name, _)| name == discriminator)
            .and_then(|(_, field)| match field.descriptor() {
                TypeDescriptor::Literal(literal) => Some(literal.to_value()),
                _ => None,
            }),
        _ => None,
    }
}

fn merge_values(left: Value, right: Value) -> Option<Value> {
    match (left, right) {
        (Value::Object(mut l), Value::Object(r)) => {
            for (k, rv) in r {
                let merged = match l.remove(&k) {
                    Some(lv) => merge_values(lv, rv)?,
                    None => rv,
                };
                l.insert(k, merged);
            }
            Some(Value::Object(l))
        }
        (Value::Array(l), Value::Array(r)) if l.len() == r.len() => l
            .into_iter()
            .zip(r)
            .map(|(a, b)| merge_values(a, b))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (l, r) if l == r => Some(l),
        _ => None,
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("url pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::schema::{self, SchemaExt};

    fn check(schema: impl Into<Schema>, value: impl Into<Value>) -> Result<Value, ValidationErrors> {
        validate(&schema.into(), value.into(), &DefaultMessages)
    }

    fn messages(result: Result<Value, ValidationErrors>) -> Vec<String> {
        match result {
            Ok(v) => panic!("expected failure, got {:?}", v),
            Err(errors) => errors.iter().map(|i| i.message.clone()).collect(),
        }
    }

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_required_wording() {
        assert_eq!(messages(check(schema::number(), Value::Undefined)), vec!["Required"]);

        let env = validate(&schema::number().into(), Value::Undefined, &EnvMessages);
        assert_eq!(messages(env), vec![REQUIRED_MESSAGE]);
    }

    #[test]
    fn test_env_messages_override_only_required() {
        let env = validate(&schema::number().into(), Value::from("12abc"), &EnvMessages);
        assert_eq!(messages(env), vec!["Expected number, received string"]);
    }

    #[test]
    fn test_closure_message_map() {
        let shout = |_: &IssueCode, default: &str| default.to_uppercase();
        let result = validate(&schema::boolean(), Value::from("y"), &shout);
        assert_eq!(messages(result), vec!["EXPECTED BOOLEAN, RECEIVED STRING"]);
    }

    #[test]
    fn test_string_checks_accumulate() {
        let s = schema::string().min_length(5).starts_with("x");
        assert_eq!(
            messages(check(s, "abc")),
            vec![
                "String must contain at least 5 character(s)",
                "Invalid input: must start with \"x\"",
            ]
        );
    }

    #[test]
    fn test_string_formats() {
        assert!(check(schema::string().email(), "ops@example.com").is_ok());
        assert_eq!(messages(check(schema::string().email(), "nope")), vec!["Invalid email"]);
        assert!(check(schema::string().url(), "https://example.com/x").is_ok());
        assert_eq!(messages(check(schema::string().url(), "example")), vec!["Invalid url"]);
    }

    #[test]
    fn test_number_checks() {
        assert!(check(schema::number().int().min(1.0), 8080.0).is_ok());
        assert_eq!(
            messages(check(schema::number().min(10.0), 3.0)),
            vec!["Number must be greater than or equal to 10"]
        );
        assert_eq!(
            messages(check(schema::number().int(), 1.5)),
            vec!["Expected integer, received float"]
        );
        assert_eq!(
            messages(check(schema::number().lt(5.0), 5.0)),
            vec!["Number must be less than 5"]
        );
        assert_eq!(
            messages(check(schema::number(), f64::INFINITY)),
            vec!["Number must be finite"]
        );
    }

    #[test]
    fn test_bigint_checks() {
        assert!(check(schema::bigint().min(0), Value::BigInt(7)).is_ok());
        assert_eq!(
            messages(check(schema::bigint().max(5), Value::BigInt(7))),
            vec!["BigInt must be less than or equal to 5"]
        );
        assert_eq!(
            messages(check(schema::bigint(), 7.0)),
            vec!["Expected bigint, received number"]
        );
    }

    #[test]
    fn test_enum_and_literal() {
        let levels = schema::enumeration(["debug", "info"]);
        assert!(check(levels.clone(), "info").is_ok());
        assert_eq!(
            messages(check(levels, "trace")),
            vec!["Invalid enum value. Expected 'debug' | 'info', received 'trace'"]
        );

        assert!(check(schema::literal(3), 3.0).is_ok());
        assert_eq!(
            messages(check(schema::literal("on"), "off")),
            vec!["Invalid literal value, expected \"on\""]
        );
    }

    #[test]
    fn test_date() {
        assert_eq!(messages(check(schema::date(), Value::InvalidDate)), vec!["Invalid date"]);
        assert_eq!(
            messages(check(schema::date(), "2024-01-01")),
            vec!["Expected date, received string"]
        );
    }

    #[test]
    fn test_object_strips_unknown_and_reports_paths() {
        let s = schema::object([
            ("host", Schema::from(schema::string())),
            ("port", schema::number().into()),
        ]);
        let ok = check(
            s.clone(),
            obj(&[("host", "db".into()), ("port", 5432.0.into()), ("extra", true.into())]),
        )
        .unwrap();
        assert_eq!(ok, obj(&[("host", "db".into()), ("port", 5432.0.into())]));

        let err = check(s, obj(&[("port", "x".into())])).unwrap_err();
        let flat = err.flatten();
        assert!(flat.form_errors.is_empty());
        assert_eq!(
            flat.field_errors,
            vec![
                ("host".to_string(), vec!["Required".to_string()]),
                ("port".to_string(), vec!["Expected number, received string".to_string()]),
            ]
        );
    }

    #[test]
    fn test_object_omits_absent_optional_members() {
        let s = schema::object([("a", schema::string().optional())]);
        assert_eq!(check(s, obj(&[])).unwrap(), obj(&[]));
    }

    #[test]
    fn test_nested_default_fills_member() {
        let s = schema::object([("retries", schema::number().default_value(3))]);
        assert_eq!(check(s, obj(&[])).unwrap(), obj(&[("retries", 3.into())]));
    }

    #[test]
    fn test_array_elements_and_size() {
        let s = schema::array(schema::number()).min_length(2);
        assert!(check(s.clone(), Value::from(vec![1.0, 2.0])).is_ok());

        let err = check(s, Value::Array(vec![Value::from("x")])).unwrap_err();
        let msgs: Vec<String> = err.iter().map(|i| i.message.clone()).collect();
        assert_eq!(
            msgs,
            vec![
                "Array must contain at least 2 element(s)",
                "Expected number, received string",
            ]
        );
        assert_eq!(err.iter().nth(1).unwrap().path, vec![PathSegment::Index(0)]);
    }

    #[test]
    fn test_tuple_length() {
        let s = schema::tuple([schema::string(), schema::string()]);
        assert!(check(s.clone(), Value::from(vec!["a", "b"])).is_ok());
        assert_eq!(
            messages(check(s, Value::from(vec!["a"]))),
            vec!["Array must contain at least 2 element(s)"]
        );
    }

    #[test]
    fn test_record_checks_every_member() {
        let s = schema::record(schema::boolean());
        assert!(check(s.clone(), obj(&[("a", true.into())])).is_ok());
        let err = check(s, obj(&[("a", true.into()), ("b", "no".into())])).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.iter().next().unwrap().path, vec![PathSegment::Key("b".to_string())]);
    }

    #[test]
    fn test_intersection_merges_objects() {
        let s = schema::intersection(
            schema::object([("a", schema::string())]),
            schema::object([("b", schema::number())]),
        );
        let input = obj(&[("a", "x".into()), ("b", 1.0.into())]);
        assert_eq!(check(s, input.clone()).unwrap(), input);
    }

    #[test]
    fn test_wrappers() {
        assert_eq!(check(schema::string().optional(), Value::Undefined).unwrap(), Value::Undefined);
        assert_eq!(check(schema::string().nullable(), Value::Null).unwrap(), Value::Null);
        assert_eq!(
            messages(check(schema::string().nullable(), Value::Undefined)),
            vec!["Required"]
        );
        assert_eq!(check(schema::string().default_value("d"), Value::Undefined).unwrap(), Value::from("d"));
    }

    #[test]
    fn test_effects() {
        let upper = schema::string().transform(|v| match v {
            Value::String(s) => Ok(Value::String(s.to_uppercase())),
            other => Ok(other),
        });
        assert_eq!(check(upper, "abc").unwrap(), Value::from("ABC"));

        let even = schema::number().refine(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0), "must be even");
        assert!(check(even.clone(), 4.0).is_ok());
        assert_eq!(messages(check(even, 3.0)), vec!["must be even"]);

        let failing = schema::string().transform(|_| Err("cannot transform".to_string()));
        assert_eq!(messages(check(failing, "x")), vec!["cannot transform"]);

        let trimmed = schema::preprocess(
            |v| match v {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            },
            schema::string().length(3),
        );
        assert_eq!(check(trimmed, "  abc ").unwrap(), Value::from("abc"));
    }

    #[test]
    fn test_union_and_discriminated_union() {
        let s = schema::union([Schema::from(schema::string()), schema::number().into()]);
        assert!(check(s.clone(), 1.0).is_ok());
        assert_eq!(messages(check(s, true)), vec!["Invalid input"]);

        let d = schema::discriminated_union(
            "kind",
            [
                schema::object([("kind", schema::literal("a")), ("x", schema::string().into())]),
                schema::object([("kind", schema::literal("b"))]),
            ],
        );
        assert!(check(d.clone(), obj(&[("kind", "b".into())])).is_ok());
        let err = check(d, obj(&[("kind", "c".into())])).unwrap_err();
        assert_eq!(
            err.iter().next().unwrap().message,
            "Invalid discriminator value. Expected 'a' | 'b'"
        );
    }

    #[test]
    fn test_catch_and_any() {
        assert_eq!(check(schema::number().catch(0), "x").unwrap(), Value::Number(0.0));
        assert_eq!(check(schema::any(), "x").unwrap(), Value::from("x"));
        assert_eq!(
            messages(check(schema::map(schema::string(), schema::string()), obj(&[]))),
            vec!["Expected map, received object"]
        );
    }
}
