//! Core of the binary-conversion API
//!
//! This module provides the trait definitions for `Encode` and `Decode`, the
//! byte-level halves of the canonical codec. They are implemented for the
//! tagged-JSON intermediate form ([`TaggedJson`](crate::codec::json::TaggedJson))
//! by the default Plutus CBOR codec, and may be implemented by callers that
//! need a different byte format behind [`CanonicalCodec`](crate::codec::CanonicalCodec).
//!
//! The sub-module [`target`] offers the [`target::Target`] abstraction, the
//! dual of [`Parser`] used as the generic bound for serialization.

use crate::error::{DecodeError, DecodeResult};
use crate::parse::{ParseResult, Parser, TryIntoParser};

use self::target::{ByteCounter, Target};

pub mod target;

/// Trait providing methods for serializing values of a certain type
///
/// Implementations are defined by one required method, [`write_to`]: it writes
/// `self` to the specified buffer and returns the number of bytes written.
/// Encoding is infallible; every value that can be constructed can be written.
///
/// [`write_to`]: Encode::write_to
pub trait Encode {
    /// Appends the serialized bytes of `self` to `buf`
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// Constructs and returns a buffer of type `U` that has been populated with the
    /// serialized bytes of `self`
    fn encode<U: Target>(&self) -> U {
        let mut buf: U = U::create();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Constructs and returns a `Vec<u8>` containing the serialized bytes of `self`
    fn to_bytes(&self) -> Vec<u8> {
        self.encode::<Vec<u8>>()
    }
}

/// Extension trait for `Encode` with serialization-length oracles
pub trait EncodeLength: Encode {
    /// Computes, without allocation, the number of bytes in the serialized
    /// form of `self`, by writing to a [`ByteCounter`]
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut ByteCounter::create())
    }
}

impl<T: Encode + ?Sized> EncodeLength for T {}

/// Trait providing methods for deserializing binary data into values of a certain type
///
/// Implementations are defined by one required method, [`parse`], which consumes
/// exactly the bytes of one value from a [`Parser`].
///
/// [`parse`]: Decode::parse
pub trait Decode {
    /// Attempt to consume and interpret a value of type `Self` from an existing
    /// `Parser` object over a binary buffer.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Attempt to decode a value of the `Self` type from `input`, which must
    /// contain exactly one encoded value.
    ///
    /// # Errors
    ///
    /// Propagates failures from both the conversion into a parser and from
    /// [`parse`](Decode::parse); bytes left over after the value are reported
    /// as [`DecodeError::NonEmpty`].
    fn try_decode<U, P>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        P: Parser,
        U: TryIntoParser<P>,
        DecodeError: From<U::Error>,
    {
        let mut p: P = input.try_into_parser()?;
        let ret = Self::parse(&mut p)?;
        match p.remainder() {
            0 => Ok(ret),
            residual => Err(DecodeError::NonEmpty { residual }),
        }
    }
}
