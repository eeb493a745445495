//! Schema descriptors.
//!
//! A [`Schema`] is a tree of [`TypeDescriptor`] nodes: leaf types, structured
//! types, wrappers (optional, nullable, default, effects) and a handful of
//! tags that exist only so they can be rejected explicitly.
//!
//! # Example
//!
//! ```
//! use preflight::schema::{self, SchemaExt};
//!
//! let port = schema::number().int().min(1.0).max(65535.0);
//! let debug = schema::boolean().optional();
//! let hosts = schema::array(schema::string()).describe("allowed hosts, as JSON");
//! # let _ = (port, debug, hosts);
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::value::Value;

/// Produces a default value. May be non-deterministic; callers invoke it at
/// most once per resolution.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Post-validation transformation. An `Err` becomes a validation issue.
pub type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Post-validation predicate.
pub type RefineFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Pre-validation rewrite of the input.
pub type PreprocessFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A literal value a schema can match exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
    BigInt(i128),
    Null,
    Undefined,
}

impl Literal {
    /// The value this literal matches.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(*n),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::BigInt(i) => Value::BigInt(*i),
            Literal::Null => Value::Null,
            Literal::Undefined => Value::Undefined,
        }
    }

    /// Rendering used in enum option lists.
    pub(crate) fn option_name(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            other => other.to_value().to_string(),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(f64::from(n))
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// Constraint on a string.
#[derive(Debug, Clone)]
pub enum StringCheck {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Email,
    Url,
    Regex(Regex),
    StartsWith(String),
    EndsWith(String),
}

/// Constraint on a number.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    /// Greater than or equal
    Min(f64),
    /// Less than or equal
    Max(f64),
    /// Strictly greater
    Gt(f64),
    /// Strictly less
    Lt(f64),
    Int,
}

/// Constraint on a big integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BigIntCheck {
    Min(i128),
    Max(i128),
}

/// Constraint on an array's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayCheck {
    MinLength(usize),
    MaxLength(usize),
}

/// Side effect attached to an inner schema.
#[derive(Clone)]
pub enum Effect {
    /// Rewrite the input before the inner schema sees it
    Preprocess(PreprocessFn),
    /// Map the validated value
    Transform(TransformFn),
    /// Reject validated values failing a predicate
    Refine(RefineFn, String),
}

/// Fieldless view of a [`TypeDescriptor`], used for naming in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Number,
    BigInt,
    Boolean,
    Enum,
    NativeEnum,
    Literal,
    Date,
    Null,
    Undefined,
    Void,
    Never,
    Function,
    Promise,
    Map,
    Set,
    Branded,
    Catch,
    NaN,
    Pipeline,
    Array,
    Object,
    Tuple,
    Record,
    Intersection,
    Optional,
    Nullable,
    Default,
    Effects,
    Union,
    DiscriminatedUnion,
    Any,
    Unknown,
}

impl TypeTag {
    /// Tag name as it appears in messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Number => "Number",
            TypeTag::BigInt => "BigInt",
            TypeTag::Boolean => "Boolean",
            TypeTag::Enum => "Enum",
            TypeTag::NativeEnum => "NativeEnum",
            TypeTag::Literal => "Literal",
            TypeTag::Date => "Date",
            TypeTag::Null => "Null",
            TypeTag::Undefined => "Undefined",
            TypeTag::Void => "Void",
            TypeTag::Never => "Never",
            TypeTag::Function => "Function",
            TypeTag::Promise => "Promise",
            TypeTag::Map => "Map",
            TypeTag::Set => "Set",
            TypeTag::Branded => "Branded",
            TypeTag::Catch => "Catch",
            TypeTag::NaN => "NaN",
            TypeTag::Pipeline => "Pipeline",
            TypeTag::Array => "Array",
            TypeTag::Object => "Object",
            TypeTag::Tuple => "Tuple",
            TypeTag::Record => "Record",
            TypeTag::Intersection => "Intersection",
            TypeTag::Optional => "Optional",
            TypeTag::Nullable => "Nullable",
            TypeTag::Default => "Default",
            TypeTag::Effects => "Effects",
            TypeTag::Union => "Union",
            TypeTag::DiscriminatedUnion => "DiscriminatedUnion",
            TypeTag::Any => "Any",
            TypeTag::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One node of a schema tree.
#[derive(Clone)]
pub enum TypeDescriptor {
    String(Vec<StringCheck>),
    Number(Vec<NumberCheck>),
    BigInt(Vec<BigIntCheck>),
    Boolean,
    Enum(Vec<String>),
    NativeEnum(Vec<Literal>),
    Literal(Literal),
    Date,
    Null,
    Undefined,
    Void,
    Never,
    Function,
    Promise(Box<Schema>),
    Map(Box<Schema>, Box<Schema>),
    Set(Box<Schema>),
    Branded(Box<Schema>),
    Catch(Box<Schema>, Value),
    NaN,
    Pipeline(Box<Schema>, Box<Schema>),
    Array(Box<Schema>, Vec<ArrayCheck>),
    Object(Vec<(String, Schema)>),
    Tuple(Vec<Schema>),
    Record(Box<Schema>),
    Intersection(Box<Schema>, Box<Schema>),
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    Default(Box<Schema>, DefaultFn),
    Effects(Box<Schema>, Effect),
    Union(Vec<Schema>),
    DiscriminatedUnion(String, Vec<Schema>),
    Any,
    Unknown,
}

impl TypeDescriptor {
    /// The tag of this node.
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeDescriptor::String(_) => TypeTag::String,
            TypeDescriptor::Number(_) => TypeTag::Number,
            TypeDescriptor::BigInt(_) => TypeTag::BigInt,
            TypeDescriptor::Boolean => TypeTag::Boolean,
            TypeDescriptor::Enum(_) => TypeTag::Enum,
            TypeDescriptor::NativeEnum(_) => TypeTag::NativeEnum,
            TypeDescriptor::Literal(_) => TypeTag::Literal,
            TypeDescriptor::Date => TypeTag::Date,
            TypeDescriptor::Null => TypeTag::Null,
            TypeDescriptor::Undefined => TypeTag::Undefined,
            TypeDescriptor::Void => TypeTag::Void,
            TypeDescriptor::Never => TypeTag::Never,
            TypeDescriptor::Function => TypeTag::Function,
            TypeDescriptor::Promise(_) => TypeTag::Promise,
            TypeDescriptor::Map(_, _) => TypeTag::Map,
            TypeDescriptor::Set(_) => TypeTag::Set,
            TypeDescriptor::Branded(_) => TypeTag::Branded,
            TypeDescriptor::Catch(_, _) => TypeTag::Catch,
            TypeDescriptor::NaN => TypeTag::NaN,
            TypeDescriptor::Pipeline(_, _) => TypeTag::Pipeline,
            TypeDescriptor::Array(_, _) => TypeTag::Array,
            TypeDescriptor::Object(_) => TypeTag::Object,
            TypeDescriptor::Tuple(_) => TypeTag::Tuple,
            TypeDescriptor::Record(_) => TypeTag::Record,
            TypeDescriptor::Intersection(_, _) => TypeTag::Intersection,
            TypeDescriptor::Optional(_) => TypeTag::Optional,
            TypeDescriptor::Nullable(_) => TypeTag::Nullable,
            TypeDescriptor::Default(_, _) => TypeTag::Default,
            TypeDescriptor::Effects(_, _) => TypeTag::Effects,
            TypeDescriptor::Union(_) => TypeTag::Union,
            TypeDescriptor::DiscriminatedUnion(_, _) => TypeTag::DiscriminatedUnion,
            TypeDescriptor::Any => TypeTag::Any,
            TypeDescriptor::Unknown => TypeTag::Unknown,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A type descriptor with an optional human description.
#[derive(Debug, Clone)]
pub struct Schema {
    descriptor: TypeDescriptor,
    description: Option<String>,
}

impl Schema {
    /// Wrap a descriptor.
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            description: None,
        }
    }

    /// The root node.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The root tag.
    pub fn tag(&self) -> TypeTag {
        self.descriptor.tag()
    }

    /// Description attached with [`SchemaExt::describe`].
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn wrap(self, wrap: impl FnOnce(Box<Schema>) -> TypeDescriptor) -> Schema {
        // descriptions stay on the outermost node
        let description = self.description.clone();
        Schema {
            descriptor: wrap(Box::new(self)),
            description,
        }
    }
}

impl From<TypeDescriptor> for Schema {
    fn from(descriptor: TypeDescriptor) -> Self {
        Schema::new(descriptor)
    }
}

/// Wrapping combinators available on every schema builder.
pub trait SchemaExt: Into<Schema> + Sized {
    /// Accept absence.
    fn optional(self) -> Schema {
        self.into().wrap(TypeDescriptor::Optional)
    }

    /// Accept explicit null.
    fn nullable(self) -> Schema {
        self.into().wrap(TypeDescriptor::Nullable)
    }

    /// Use a fixed value when absent.
    fn default_value(self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        self.default_with(move || value.clone())
    }

    /// Use a computed value when absent.
    fn default_with<F>(self, f: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        let f: DefaultFn = Arc::new(f);
        self.into()
            .wrap(move |inner| TypeDescriptor::Default(inner, f))
    }

    /// Map the validated value.
    fn transform<F>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        let f: TransformFn = Arc::new(f);
        self.into()
            .wrap(move |inner| TypeDescriptor::Effects(inner, Effect::Transform(f)))
    }

    /// Reject validated values failing `predicate`.
    fn refine<F>(self, predicate: F, message: impl Into<String>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let f: RefineFn = Arc::new(predicate);
        let message = message.into();
        self.into()
            .wrap(move |inner| TypeDescriptor::Effects(inner, Effect::Refine(f, message)))
    }

    /// Nominal marker; validates like the inner schema.
    fn brand(self) -> Schema {
        self.into().wrap(TypeDescriptor::Branded)
    }

    /// Replace any validation failure with `fallback`.
    fn catch(self, fallback: impl Into<Value>) -> Schema {
        let fallback = fallback.into();
        self.into()
            .wrap(move |inner| TypeDescriptor::Catch(inner, fallback))
    }

    /// Feed this schema's output into `next`.
    fn pipe(self, next: impl Into<Schema>) -> Schema {
        let next = Box::new(next.into());
        self.into()
            .wrap(move |inner| TypeDescriptor::Pipeline(inner, next))
    }

    /// Attach a human description, shown in failure reports.
    fn describe(self, description: impl Into<String>) -> Schema {
        let mut schema = self.into();
        schema.description = Some(description.into());
        schema
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

/// Builder for string schemas.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    checks: Vec<StringCheck>,
}

impl StringSchema {
    pub fn min_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MinLength(n));
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MaxLength(n));
        self
    }

    pub fn length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::Length(n));
        self
    }

    /// Shorthand for `min_length(1)`.
    pub fn non_empty(self) -> Self {
        self.min_length(1)
    }

    pub fn email(mut self) -> Self {
        self.checks.push(StringCheck::Email);
        self
    }

    pub fn url(mut self) -> Self {
        self.checks.push(StringCheck::Url);
        self
    }

    pub fn regex(mut self, pattern: Regex) -> Self {
        self.checks.push(StringCheck::Regex(pattern));
        self
    }

    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.checks.push(StringCheck::StartsWith(prefix.into()));
        self
    }

    pub fn ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.checks.push(StringCheck::EndsWith(suffix.into()));
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(s: StringSchema) -> Self {
        Schema::new(TypeDescriptor::String(s.checks))
    }
}

/// Builder for number schemas.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    checks: Vec<NumberCheck>,
}

impl NumberSchema {
    /// Greater than or equal to `n`.
    pub fn min(mut self, n: f64) -> Self {
        self.checks.push(NumberCheck::Min(n));
        self
    }

    /// Less than or equal to `n`.
    pub fn max(mut self, n: f64) -> Self {
        self.checks.push(NumberCheck::Max(n));
        self
    }

    pub fn gt(mut self, n: f64) -> Self {
        self.checks.push(NumberCheck::Gt(n));
        self
    }

    pub fn lt(mut self, n: f64) -> Self {
        self.checks.push(NumberCheck::Lt(n));
        self
    }

    pub fn int(mut self) -> Self {
        self.checks.push(NumberCheck::Int);
        self
    }

    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    pub fn nonnegative(self) -> Self {
        self.min(0.0)
    }
}

impl From<NumberSchema> for Schema {
    fn from(s: NumberSchema) -> Self {
        Schema::new(TypeDescriptor::Number(s.checks))
    }
}

/// Builder for big integer schemas.
#[derive(Debug, Clone, Default)]
pub struct BigIntSchema {
    checks: Vec<BigIntCheck>,
}

impl BigIntSchema {
    pub fn min(mut self, n: i128) -> Self {
        self.checks.push(BigIntCheck::Min(n));
        self
    }

    pub fn max(mut self, n: i128) -> Self {
        self.checks.push(BigIntCheck::Max(n));
        self
    }
}

impl From<BigIntSchema> for Schema {
    fn from(s: BigIntSchema) -> Self {
        Schema::new(TypeDescriptor::BigInt(s.checks))
    }
}

/// Builder for array schemas.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    element: Schema,
    checks: Vec<ArrayCheck>,
}

impl ArraySchema {
    pub fn min_length(mut self, n: usize) -> Self {
        self.checks.push(ArrayCheck::MinLength(n));
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.checks.push(ArrayCheck::MaxLength(n));
        self
    }

    pub fn non_empty(self) -> Self {
        self.min_length(1)
    }
}

impl From<ArraySchema> for Schema {
    fn from(s: ArraySchema) -> Self {
        Schema::new(TypeDescriptor::Array(Box::new(s.element), s.checks))
    }
}

pub fn string() -> StringSchema {
    StringSchema::default()
}

pub fn number() -> NumberSchema {
    NumberSchema::default()
}

pub fn bigint() -> BigIntSchema {
    BigIntSchema::default()
}

pub fn boolean() -> Schema {
    Schema::new(TypeDescriptor::Boolean)
}

/// One of a fixed set of strings.
pub fn enumeration<I, S>(options: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::new(TypeDescriptor::Enum(
        options.into_iter().map(Into::into).collect(),
    ))
}

/// One of a fixed set of literal members.
pub fn native_enum<I, L>(members: I) -> Schema
where
    I: IntoIterator<Item = L>,
    L: Into<Literal>,
{
    Schema::new(TypeDescriptor::NativeEnum(
        members.into_iter().map(Into::into).collect(),
    ))
}

pub fn literal(value: impl Into<Literal>) -> Schema {
    Schema::new(TypeDescriptor::Literal(value.into()))
}

pub fn date() -> Schema {
    Schema::new(TypeDescriptor::Date)
}

pub fn null() -> Schema {
    Schema::new(TypeDescriptor::Null)
}

pub fn undefined() -> Schema {
    Schema::new(TypeDescriptor::Undefined)
}

pub fn void() -> Schema {
    Schema::new(TypeDescriptor::Void)
}

pub fn never() -> Schema {
    Schema::new(TypeDescriptor::Never)
}

pub fn function() -> Schema {
    Schema::new(TypeDescriptor::Function)
}

pub fn promise(inner: impl Into<Schema>) -> Schema {
    Schema::new(TypeDescriptor::Promise(Box::new(inner.into())))
}

pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> Schema {
    Schema::new(TypeDescriptor::Map(
        Box::new(key.into()),
        Box::new(value.into()),
    ))
}

pub fn set(element: impl Into<Schema>) -> Schema {
    Schema::new(TypeDescriptor::Set(Box::new(element.into())))
}

pub fn nan() -> Schema {
    Schema::new(TypeDescriptor::NaN)
}

pub fn array(element: impl Into<Schema>) -> ArraySchema {
    ArraySchema {
        element: element.into(),
        checks: Vec::new(),
    }
}

/// Object with the given members; unknown members are stripped.
pub fn object<I, K, S>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<Schema>,
{
    Schema::new(TypeDescriptor::Object(
        fields
            .into_iter()
            .map(|(k, s)| (k.into(), s.into()))
            .collect(),
    ))
}

pub fn tuple<I, S>(items: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::new(TypeDescriptor::Tuple(
        items.into_iter().map(Into::into).collect(),
    ))
}

/// Object with arbitrary keys whose values all match `value`.
pub fn record(value: impl Into<Schema>) -> Schema {
    Schema::new(TypeDescriptor::Record(Box::new(value.into())))
}

pub fn intersection(left: impl Into<Schema>, right: impl Into<Schema>) -> Schema {
    Schema::new(TypeDescriptor::Intersection(
        Box::new(left.into()),
        Box::new(right.into()),
    ))
}

pub fn union<I, S>(options: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::new(TypeDescriptor::Union(
        options.into_iter().map(Into::into).collect(),
    ))
}

pub fn discriminated_union<I, S>(discriminator: impl Into<String>, options: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::new(TypeDescriptor::DiscriminatedUnion(
        discriminator.into(),
        options.into_iter().map(Into::into).collect(),
    ))
}

pub fn any() -> Schema {
    Schema::new(TypeDescriptor::Any)
}

pub fn unknown() -> Schema {
    Schema::new(TypeDescriptor::Unknown)
}

/// Rewrite the input with `f` before `schema` validates it.
pub fn preprocess<F>(f: F, schema: impl Into<Schema>) -> Schema
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    let f: PreprocessFn = Arc::new(f);
    schema
        .into()
        .wrap(move |inner| TypeDescriptor::Effects(inner, Effect::Preprocess(f)))
}
