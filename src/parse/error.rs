//! Error types used to report failure in low-level parsing
//!
//! This module defines the primary type `ParseError` and the alias
//! `ParseResult<T>`, along with [`TokenError`], the refinement covering
//! bytes that were present but could not be interpreted as Plutus Data.

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types, or while decoding canonical bytes through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Error case when a method that attempts to consume some number
    /// of bytes would run past the end of the buffer
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Error class encountered when low-level parsing is unsuccessful due
    /// to a failure of expectation in terms of the binary-lexical contents
    /// of the buffer.
    Token(TokenError),
    /// Nesting of lists, maps and constructors exceeded the decoder's limit
    DepthExceeded { limit: usize },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::ConsumeWouldExceedLimit {
                offset,
                requested,
                limit,
            } => write!(
                f,
                "cannot increment offset by {} bytes (currently at byte {} out of limit {})",
                requested, offset, limit
            ),
            ParseError::Token(err) => Display::fmt(err, f),
            ParseError::DepthExceeded { limit } => {
                write!(f, "nesting depth exceeded limit of {}", limit)
            }
        }
    }
}

impl From<Infallible> for ParseError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Token(err) => Some(err),
            _ => None,
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors for bytes that were read successfully but do not form a legal
/// token of the canonical encoding at their position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Additional-information values 28..=30 are reserved
    ReservedInfo { byte: u8, offset: usize },
    /// Major type not permitted at this position
    UnexpectedMajor {
        expected: &'static str,
        found: u8,
        offset: usize,
    },
    /// Semantic tag that is neither a constructor nor a bignum tag
    UnsupportedTag { tag: u64, offset: usize },
    /// Break byte (`0xff`) outside an indefinite-length item
    StrayBreak { offset: usize },
    /// Chunk of an indefinite byte string that is not itself a definite byte string
    InvalidChunk { offset: usize },
    /// Head that was not encoded in its shortest form
    NonMinimal { offset: usize },
    /// Length or index that does not fit the host's integer types
    Overflow { offset: usize },
    /// Tag 102 whose payload is not `[index, fields]`
    MalformedConstr { offset: usize },
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TokenError::ReservedInfo { byte, offset } => {
                write!(f, "reserved initial byte 0x{:02x} at offset {}", byte, offset)
            }
            TokenError::UnexpectedMajor {
                expected,
                found,
                offset,
            } => write!(
                f,
                "expected {} at offset {}, found major type {}",
                expected, offset, found
            ),
            TokenError::UnsupportedTag { tag, offset } => {
                write!(f, "unsupported tag {} at offset {}", tag, offset)
            }
            TokenError::StrayBreak { offset } => {
                write!(f, "unexpected break at offset {}", offset)
            }
            TokenError::InvalidChunk { offset } => {
                write!(f, "invalid byte-string chunk at offset {}", offset)
            }
            TokenError::NonMinimal { offset } => {
                write!(f, "non-minimal head at offset {}", offset)
            }
            TokenError::Overflow { offset } => {
                write!(f, "length or index at offset {} does not fit", offset)
            }
            TokenError::MalformedConstr { offset } => {
                write!(f, "malformed general constructor at offset {}", offset)
            }
        }
    }
}

impl Error for TokenError {}
