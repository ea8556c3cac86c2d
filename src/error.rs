//! General error types
//!
//! This module contains the error hierarchy shared by every layer of the crate,
//! from hex conversion up to schema construction and casting. Errors raised by
//! the byte-level decoder live in [`crate::parse::error`] and are folded into
//! [`DecodeError`] here.
//!
//! Every error is raised synchronously and terminates the call that produced it;
//! nothing in this crate retries or recovers on behalf of the caller.

use std::error::Error as StdError;
use std::fmt::{Debug, Display, Formatter};

use num_bigint::BigInt;

use crate::parse::error::ParseError;

/// Error type representing all possible conditions for invalidity
/// encountered when attempting to parse a string-type as a series
/// of hex-encoded bytes.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum HexConvError {
    /// Error case for odd-length strings
    OddParity(String),
    /// Error case for strings containing non-hex characters,
    /// i.e. anything not in `[0-9a-fA-F]`.
    NonHex(String),
}

impl Debug for HexConvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(invalid) => {
                write!(f, "non-even length-parity for string `{}`", invalid)
            }
            Self::NonHex(invalid) => write!(f, "non-hex character found in string `{}`", invalid),
        }
    }
}

impl Display for HexConvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(_) => write!(f, "hex-conversion failed on odd-length string"),
            Self::NonHex(_) => write!(f, "hex-conversion failed on non-hex character"),
        }
    }
}

impl StdError for HexConvError {}

/// Enumerated error type for byte strings whose width falls outside
/// the `[min, max]` window declared by a bytes schema.
///
/// Structurally similar to [`LengthError`], which covers the number of
/// elements in a list or map rather than the number of bytes.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum WidthError {
    /// Requirement of minimum byte-width not satisfied
    TooNarrow { min: usize, actual: usize },
    /// Restriction on maximum byte-width exceeded
    TooWide { limit: usize, actual: usize },
}

impl Display for WidthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthError::TooNarrow { min, actual } => {
                write!(f, "{actual}-byte value is shorter than the minimum of {min} bytes")
            }
            WidthError::TooWide { limit, actual } => {
                write!(f, "{actual}-byte value exceeded limit of {limit} bytes")
            }
        }
    }
}

impl StdError for WidthError {}

/// Enumerated error type for lists and maps whose element-count falls outside
/// the `[min, max]` window declared by their schema.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Requirement of minimum element-count not satisfied
    TooShort { min: usize, actual: usize },
    /// Restriction on maximum element-count exceeded
    TooLong { limit: usize, actual: usize },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooShort { min, actual } => {
                write!(f, "{actual}-element value needs at least {min} elements")
            }
            LengthError::TooLong { limit, actual } => {
                write!(f, "{actual}-element value exceeded limit of {limit} elements")
            }
        }
    }
}

impl StdError for LengthError {}

/// Error type representing an integer that falls outside the range declared
/// by an integer schema.
///
/// Inclusive bounds (`minimum`, `maximum`) and exclusive bounds
/// (`exclusiveMinimum`, `exclusiveMaximum`) are reported separately so that
/// the message names the keyword that was violated.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum BoundsError {
    Underflow { min: BigInt, val: BigInt },
    Overflow { max: BigInt, val: BigInt },
    ExclusiveUnderflow { min: BigInt, val: BigInt },
    ExclusiveOverflow { max: BigInt, val: BigInt },
}

impl Display for BoundsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundsError::Underflow { min, val } => {
                write!(f, "provided value {} less than minimum bound {}", val, min)
            }
            BoundsError::Overflow { max, val } => {
                write!(f, "provided value {} greater than maximum bound {}", val, max)
            }
            BoundsError::ExclusiveUnderflow { min, val } => {
                write!(f, "provided value {} not above exclusive minimum {}", val, min)
            }
            BoundsError::ExclusiveOverflow { max, val } => {
                write!(f, "provided value {} not below exclusive maximum {}", val, max)
            }
        }
    }
}

impl StdError for BoundsError {}

/// A value whose shape matched its schema but which failed a range, width,
/// membership, cardinality or uniqueness rule.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConstraintError {
    Bounds(BoundsError),
    Width(WidthError),
    Length(LengthError),
    /// Byte string is not one of the literals permitted by the schema
    NotInEnum { value: String },
    /// Two elements of a list declared `uniqueItems` are structurally equal
    Duplicate { first: usize, second: usize },
}

impl From<BoundsError> for ConstraintError {
    fn from(err: BoundsError) -> Self {
        Self::Bounds(err)
    }
}

impl From<WidthError> for ConstraintError {
    fn from(err: WidthError) -> Self {
        Self::Width(err)
    }
}

impl From<LengthError> for ConstraintError {
    fn from(err: LengthError) -> Self {
        Self::Length(err)
    }
}

impl Display for ConstraintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintError::Bounds(err) => Display::fmt(err, f),
            ConstraintError::Width(err) => Display::fmt(err, f),
            ConstraintError::Length(err) => Display::fmt(err, f),
            ConstraintError::NotInEnum { value } => {
                write!(f, "none of the permitted byte literals match `{}`", value)
            }
            ConstraintError::Duplicate { first, second } => {
                write!(f, "list contains duplicates at positions {} and {}", first, second)
            }
        }
    }
}

impl StdError for ConstraintError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConstraintError::Bounds(err) => Some(err),
            ConstraintError::Width(err) => Some(err),
            ConstraintError::Length(err) => Some(err),
            _ => None,
        }
    }
}

/// Violation of the first-letter casing convention that separates
/// sum-type tags (uppercase) from record fields (lowercase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    Empty,
    ExpectedUppercase(String),
    ExpectedLowercase(String),
}

impl Display for NamingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingError::Empty => write!(f, "names must not be empty"),
            NamingError::ExpectedUppercase(name) => {
                write!(f, "tag `{}` must start with an uppercase letter", name)
            }
            NamingError::ExpectedLowercase(name) => {
                write!(f, "field `{}` must start with a lowercase letter", name)
            }
        }
    }
}

impl StdError for NamingError {}

/// Failures raised while building a schema, before any value is cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Naming(NamingError),
    /// Constructor mixes titled and untitled fields
    MixedFieldTitles { constructor: Option<String> },
    DuplicateTitle(String),
    DuplicateIndex(u64),
    UnresolvedRef(String),
    /// Blueprint JSON that does not describe any known schema node
    Malformed(String),
}

impl From<NamingError> for SchemaError {
    fn from(err: NamingError) -> Self {
        Self::Naming(err)
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Naming(err) => write!(f, "naming convention violated: {}", err),
            SchemaError::MixedFieldTitles { constructor: Some(title) } => {
                write!(f, "constructor `{}` mixes titled and untitled fields", title)
            }
            SchemaError::MixedFieldTitles { constructor: None } => {
                write!(f, "constructor mixes titled and untitled fields")
            }
            SchemaError::DuplicateTitle(title) => write!(f, "title `{}` declared twice", title),
            SchemaError::DuplicateIndex(ix) => {
                write!(f, "constructor index {} declared twice", ix)
            }
            SchemaError::UnresolvedRef(name) => {
                write!(f, "reference `{}` not found in definitions", name)
            }
            SchemaError::Malformed(reason) => write!(f, "malformed schema: {}", reason),
        }
    }
}

impl StdError for SchemaError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SchemaError::Naming(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures of the structural cast engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    /// Runtime shape of the input does not match the schema node
    ShapeMismatch { expected: String, found: String },
    Constraint(ConstraintError),
    /// A `$ref` could not be found in the definitions table
    Unresolved(String),
    /// A tag or field name supplied by the caller breaks the casing convention
    Naming(NamingError),
}

impl CastError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<ConstraintError> for CastError {
    fn from(err: ConstraintError) -> Self {
        Self::Constraint(err)
    }
}

impl From<NamingError> for CastError {
    fn from(err: NamingError) -> Self {
        Self::Naming(err)
    }
}

impl Display for CastError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CastError::ShapeMismatch { expected, found } => {
                write!(f, "could not type cast: expected {}, found {}", expected, found)
            }
            CastError::Constraint(err) => write!(f, "constraint violated: {}", err),
            CastError::Unresolved(name) => {
                write!(f, "reference `{}` not found in definitions", name)
            }
            CastError::Naming(err) => write!(f, "naming convention violated: {}", err),
        }
    }
}

impl StdError for CastError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CastError::Constraint(err) => Some(err),
            CastError::Naming(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures while lifting canonical bytes back into [`Data`](crate::Data).
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeError {
    Conv(HexConvError),
    Parse(ParseError),
    /// Bytes left over after a complete value was read
    NonEmpty { residual: usize },
    /// Tagged JSON that is not one of the five recognised shapes
    Shape(String),
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(_void: std::convert::Infallible) -> Self {
        match _void {}
    }
}

impl From<HexConvError> for DecodeError {
    fn from(err: HexConvError) -> Self {
        Self::Conv(err)
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Conv(err) => write!(f, "hex conversion encountered error: {}", err),
            DecodeError::Parse(err) => write!(f, "parser encountered error: {}", err),
            DecodeError::NonEmpty { residual } => {
                write!(f, "{} trailing bytes after decoded value", residual)
            }
            DecodeError::Shape(reason) => write!(f, "unrecognised tagged json: {}", reason),
        }
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DecodeError::Conv(err) => Some(err),
            DecodeError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failures of the restricted metadata convention.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// Value or JSON shape the metadata convention cannot represent
    UnsupportedType(String),
    /// Integer outside the 64-bit range JSON numbers can carry
    OutOfRange(BigInt),
    Hex(HexConvError),
}

impl From<HexConvError> for MetadataError {
    fn from(err: HexConvError) -> Self {
        Self::Hex(err)
    }
}

impl Display for MetadataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::UnsupportedType(what) => write!(f, "unsupported type: {}", what),
            MetadataError::OutOfRange(val) => {
                write!(f, "integer {} does not fit in a metadata number", val)
            }
            MetadataError::Hex(err) => write!(f, "invalid raw bytes: {}", err),
        }
    }
}

impl StdError for MetadataError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MetadataError::Hex(err) => Some(err),
            _ => None,
        }
    }
}

/// Crate-level error unifying every failure class
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Hex(HexConvError),
    Schema(SchemaError),
    Cast(CastError),
    Decode(DecodeError),
    Metadata(MetadataError),
}

macro_rules! impl_error_from {
    ($variant:ident, $src:ty) => {
        impl From<$src> for Error {
            fn from(err: $src) -> Self {
                Error::$variant(err)
            }
        }
    };
}

impl_error_from!(Hex, HexConvError);
impl_error_from!(Schema, SchemaError);
impl_error_from!(Cast, CastError);
impl_error_from!(Decode, DecodeError);
impl_error_from!(Metadata, MetadataError);

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Decode(DecodeError::Parse(err))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Hex(err) => Display::fmt(err, f),
            Error::Schema(err) => Display::fmt(err, f),
            Error::Cast(err) => Display::fmt(err, f),
            Error::Decode(err) => Display::fmt(err, f),
            Error::Metadata(err) => Display::fmt(err, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Hex(err) => Some(err),
            Error::Schema(err) => Some(err),
            Error::Cast(err) => Some(err),
            Error::Decode(err) => Some(err),
            Error::Metadata(err) => Some(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
