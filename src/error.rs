//! Error types for environment parsing.
//!
//! Errors come in three layers:
//!
//! - [`Issue`] / [`ValidationErrors`]: what the schema validator found wrong
//!   with one value, accumulated with stillwater's `Validation`.
//! - [`KeyFailure`]: everything known about one key that failed, whether it
//!   failed in coercion or validation.
//! - [`EnvErrors`] / [`ParseEnvError`]: the aggregate raised once a run has
//!   finished with at least one failing key.

use std::fmt;

use stillwater::{NonEmptyVec, Semigroup, Validation};
use thiserror::Error;

use crate::report::{eprint_report, render_report, ReportOptions};
use crate::schema::{Literal, TypeTag};
use crate::value::Value;

/// Why a type tag has no coercion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// A reasonable thing to want, but no coercion exists for it
    NotImplemented,
    /// Accepts anything, which is meaningless when every input is a string
    /// or absent
    TooBroad,
}

/// A schema used a type tag that cannot be coerced from an environment string.
///
/// This is a mistake in the schema itself, so it is raised as soon as the
/// coercer is built instead of being batched with per-key failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedTypeError {
    #[error("type {tag} is not supported by the environment parser")]
    NotImplemented { tag: TypeTag },
    #[error(
        "type {tag} is not supported by the environment parser: environment values are \
         always a string or absent, so use a narrower schema such as string() or \
         string().optional() instead"
    )]
    TooBroad { tag: TypeTag },
}

impl UnsupportedTypeError {
    /// Build the error for a tag, choosing the message by reason.
    pub fn new(tag: TypeTag, reason: UnsupportedReason) -> Self {
        match reason {
            UnsupportedReason::NotImplemented => Self::NotImplemented { tag },
            UnsupportedReason::TooBroad => Self::TooBroad { tag },
        }
    }

    /// The offending tag.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::NotImplemented { tag } | Self::TooBroad { tag } => *tag,
        }
    }

    /// Why the tag was rejected.
    pub fn reason(&self) -> UnsupportedReason {
        match self {
            Self::NotImplemented { .. } => UnsupportedReason::NotImplemented,
            Self::TooBroad { .. } => UnsupportedReason::TooBroad,
        }
    }
}

/// A raw string could not be parsed as structured data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("malformed structured value: {message}")]
    MalformedStructuredValue { message: String },
}

impl CoercionError {
    pub(crate) fn malformed(err: &serde_json::Error) -> Self {
        Self::MalformedStructuredValue {
            message: err.to_string(),
        }
    }
}

/// One step in the path from the validated root to a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member
    Key(String),
    /// Array or tuple position
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Which size is being bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    String,
    Number,
    BigInt,
    Array,
}

/// A bound in a too-small / too-big issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Count(usize),
    Number(f64),
    BigInt(i128),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Count(n) => write!(f, "{}", n),
            Bound::Number(n) => write!(f, "{}", n),
            Bound::BigInt(n) => write!(f, "{}", n),
        }
    }
}

/// String format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Regex,
    StartsWith(String),
    EndsWith(String),
}

/// What went wrong, with enough data for a [`MessageMap`](crate::validate::MessageMap)
/// to phrase it.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueCode {
    InvalidType {
        expected: String,
        received: &'static str,
    },
    InvalidLiteral {
        expected: Literal,
    },
    InvalidEnumValue {
        options: Vec<String>,
        received: String,
    },
    InvalidDate,
    InvalidString {
        format: StringFormat,
    },
    TooSmall {
        kind: SizeKind,
        minimum: Bound,
        inclusive: bool,
        exact: bool,
    },
    TooBig {
        kind: SizeKind,
        maximum: Bound,
        inclusive: bool,
        exact: bool,
    },
    InvalidUnion,
    InvalidUnionDiscriminator {
        options: Vec<String>,
    },
    InvalidIntersectionTypes,
    NotFinite,
    Custom {
        message: String,
    },
}

impl IssueCode {
    /// The validation library's own wording for this issue.
    pub fn default_message(&self) -> String {
        match self {
            IssueCode::InvalidType { received, .. } if *received == "undefined" => {
                "Required".to_string()
            }
            IssueCode::InvalidType { expected, received } => {
                format!("Expected {}, received {}", expected, received)
            }
            IssueCode::InvalidLiteral { expected } => {
                format!("Invalid literal value, expected {}", expected.to_value())
            }
            IssueCode::InvalidEnumValue { options, received } => format!(
                "Invalid enum value. Expected {}, received '{}'",
                quote_options(options),
                received
            ),
            IssueCode::InvalidDate => "Invalid date".to_string(),
            IssueCode::InvalidString { format } => match format {
                StringFormat::Email => "Invalid email".to_string(),
                StringFormat::Url => "Invalid url".to_string(),
                StringFormat::Regex => "Invalid".to_string(),
                StringFormat::StartsWith(p) => format!("Invalid input: must start with \"{}\"", p),
                StringFormat::EndsWith(s) => format!("Invalid input: must end with \"{}\"", s),
            },
            IssueCode::TooSmall {
                kind,
                minimum,
                inclusive,
                exact,
            } => size_message(*kind, minimum, *inclusive, *exact, true),
            IssueCode::TooBig {
                kind,
                maximum,
                inclusive,
                exact,
            } => size_message(*kind, maximum, *inclusive, *exact, false),
            IssueCode::InvalidUnion => "Invalid input".to_string(),
            IssueCode::InvalidUnionDiscriminator { options } => format!(
                "Invalid discriminator value. Expected {}",
                quote_options(options)
            ),
            IssueCode::InvalidIntersectionTypes => {
                "Intersection results could not be merged".to_string()
            }
            IssueCode::NotFinite => "Number must be finite".to_string(),
            IssueCode::Custom { message } => message.clone(),
        }
    }
}

fn quote_options(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("'{}'", o))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn size_message(kind: SizeKind, bound: &Bound, inclusive: bool, exact: bool, lower: bool) -> String {
    match kind {
        SizeKind::String | SizeKind::Array => {
            let (subject, unit) = if kind == SizeKind::String {
                ("String", "character(s)")
            } else {
                ("Array", "element(s)")
            };
            let qualifier = match (exact, lower, inclusive) {
                (true, _, _) => "exactly",
                (false, true, true) => "at least",
                (false, true, false) => "over",
                (false, false, true) => "at most",
                (false, false, false) => "under",
            };
            format!("{} must contain {} {} {}", subject, qualifier, bound, unit)
        }
        SizeKind::Number | SizeKind::BigInt => {
            let subject = if kind == SizeKind::Number {
                "Number"
            } else {
                "BigInt"
            };
            let relation = match (exact, lower, inclusive) {
                (true, _, _) => "exactly equal to",
                (false, true, true) => "greater than or equal to",
                (false, true, false) => "greater than",
                (false, false, true) => "less than or equal to",
                (false, false, false) => "less than",
            };
            format!("{} must be {} {}", subject, relation, bound)
        }
    }
}

/// A single validation problem, located by path.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
            write!(f, "{}: {}", path.join("."), self.message)
        }
    }
}

/// Messages split by where they apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedErrors {
    /// Messages about the value as a whole
    pub form_errors: Vec<String>,
    /// Messages grouped by top-level member, in first-seen order
    pub field_errors: Vec<(String, Vec<String>)>,
}

/// A non-empty collection of validation issues for one value.
#[derive(Debug, Clone)]
pub struct ValidationErrors(pub NonEmptyVec<Issue>);

impl ValidationErrors {
    /// Create from a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over issues.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Split issues into whole-value messages and per-member messages.
    pub fn flatten(&self) -> FlattenedErrors {
        let mut flat = FlattenedErrors::default();
        for issue in self.iter() {
            match issue.path.first() {
                None => flat.form_errors.push(issue.message.clone()),
                Some(segment) => {
                    let name = segment.to_string();
                    match flat.field_errors.iter_mut().find(|(k, _)| *k == name) {
                        Some((_, messages)) => messages.push(issue.message.clone()),
                        None => flat
                            .field_errors
                            .push((name, vec![issue.message.clone()])),
                    }
                }
            }
        }
        flat
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<Issue> for ValidationErrors {
    fn from(issue: Issue) -> Self {
        Self::single(issue)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

/// Result type for schema validation with issue accumulation.
pub type SchemaValidation<T> = Validation<T, ValidationErrors>;

/// Why a single key failed.
#[derive(Debug, Clone, Error)]
pub enum KeyError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Everything known about one key that failed.
#[derive(Debug, Clone)]
pub struct KeyFailure {
    /// The declared key name
    pub key: String,
    /// The raw string from the environment, `None` when absent
    pub raw_value: Option<String>,
    /// Whether a default was substituted for the absent value
    pub used_default: bool,
    /// The default that was validated, when one was used
    pub default_value: Option<Value>,
    /// The description declared alongside the key, if any
    pub description: Option<String>,
    /// The underlying failure
    pub error: KeyError,
}

/// All key failures from one run, in declaration order.
///
/// `Display` renders the operator-facing report.
#[derive(Debug, Clone)]
pub struct EnvErrors {
    failures: NonEmptyVec<KeyFailure>,
    options: ReportOptions,
}

impl EnvErrors {
    /// Create from a single failure.
    pub fn single(failure: KeyFailure) -> Self {
        Self {
            failures: NonEmptyVec::singleton(failure),
            options: ReportOptions::default(),
        }
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(failures: Vec<KeyFailure>) -> Option<Self> {
        NonEmptyVec::from_vec(failures).map(|failures| Self {
            failures,
            options: ReportOptions::default(),
        })
    }

    /// Replace the options used when rendering the report.
    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// The rendering options in effect.
    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Get the first failure (always exists).
    pub fn first(&self) -> &KeyFailure {
        self.failures.head()
    }

    /// Number of failing keys.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always false; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over failures in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyFailure> {
        self.failures.iter()
    }

    /// The rendered report.
    pub fn report(&self) -> String {
        render_report(self, &self.options)
    }

    /// Write the report to stderr, colored when the options allow it.
    pub fn eprint(&self) {
        eprint_report(self, &self.options);
    }
}

impl Semigroup for EnvErrors {
    fn combine(self, other: Self) -> Self {
        Self {
            failures: self.failures.combine(other.failures),
            options: self.options,
        }
    }
}

impl IntoIterator for EnvErrors {
    type Item = KeyFailure;
    type IntoIter = std::vec::IntoIter<KeyFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_vec().into_iter()
    }
}

impl fmt::Display for EnvErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

impl std::error::Error for EnvErrors {}

/// The error returned from a parse run.
#[derive(Debug, Clone, Error)]
pub enum ParseEnvError {
    /// The schema map contains a type that cannot be coerced
    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedTypeError),
    /// One or more keys failed; the message is the full report
    #[error(transparent)]
    Invalid(#[from] EnvErrors),
}

impl ParseEnvError {
    /// The aggregated failures, if this is a per-key failure report.
    pub fn failures(&self) -> Option<&EnvErrors> {
        match self {
            ParseEnvError::Invalid(errors) => Some(errors),
            ParseEnvError::UnsupportedType(_) => None,
        }
    }
}
