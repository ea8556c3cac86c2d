//! Typed application values
//!
//! [`Value`] is the application-side counterpart of [`Data`]: what the cast
//! engine consumes in [`cast_to`](crate::cast_to) and produces in
//! [`cast_from`](crate::cast_from). Where `Data` only knows integers, bytes,
//! lists, maps and constructors, a `Value` also distinguishes booleans, optional
//! values, records with named fields, and tagged enum variants, all of which
//! are folded into constructors by the schema.
//!
//! Enum variants are modelled explicitly as a tag plus a [`Payload`] that is
//! either absent, positional, or named, so the cast engine never needs to guess
//! the intended shape from key counts.

use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::data::Data;
use crate::error::HexConvError;
use crate::hexstring::HexString;

/// Ordered field-name to value mapping of an object
pub type Record = IndexMap<String, Value>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    /// Absent value of a void (empty, index-0) constructor
    Unit,
    Bool(bool),
    Int(BigInt),
    Bytes(HexString),
    /// Arrays and tuples
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Record(Record),
    Variant(Variant),
    Nullable(Option<Box<Value>>),
    /// Untyped passthrough, produced for `Any` schemas
    Data(Data),
}

/// Sum-type value: an uppercase tag with its arguments
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variant {
    pub tag: String,
    pub payload: Payload,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Payload {
    Unit,
    Positional(Vec<Value>),
    Named(Record),
}

impl Payload {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Payload::Unit => 0,
            Payload::Positional(xs) => xs.len(),
            Payload::Named(rec) => rec.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Value {
    #[must_use]
    pub fn int(i: impl Into<BigInt>) -> Self {
        Value::Int(i.into())
    }

    pub fn bytes(hex: &str) -> Result<Self, HexConvError> {
        Ok(Value::Bytes(HexString::from_hex(hex)?))
    }

    /// Builds a record from `(field, value)` pairs, keeping their order
    pub fn record<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        )
    }

    /// Bare tag of a variant that carries no arguments
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Value::Variant(Variant {
            tag: tag.to_owned(),
            payload: Payload::Unit,
        })
    }

    #[must_use]
    pub fn positional(tag: &str, args: Vec<Value>) -> Self {
        Value::Variant(Variant {
            tag: tag.to_owned(),
            payload: Payload::Positional(args),
        })
    }

    pub fn named<'a, I>(tag: &str, args: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        Value::Variant(Variant {
            tag: tag.to_owned(),
            payload: Payload::Named(
                args.into_iter()
                    .map(|(k, v)| (k.to_owned(), v))
                    .collect(),
            ),
        })
    }

    #[must_use]
    pub fn some(inner: Value) -> Self {
        Value::Nullable(Some(Box::new(inner)))
    }

    #[must_use]
    pub const fn none() -> Self {
        Value::Nullable(None)
    }

    /// Name of the active variant, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Variant(_) => "variant",
            Value::Nullable(_) => "nullable",
            Value::Data(_) => "data",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(BigInt::from(i))
    }
}

impl From<HexString> for Value {
    fn from(b: HexString) -> Self {
        Value::Bytes(b)
    }
}

impl From<Data> for Value {
    fn from(d: Data) -> Self {
        Value::Data(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Nullable(opt.map(|v| Box::new(v.into())))
    }
}
