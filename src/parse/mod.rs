//! Byte-level parsing model
//!
//! This module provides the read side of the canonical codec: the [`Parser`]
//! trait, a small set of primitive `take_*` operations built on it, and
//! [`ByteParser`], the owned-buffer implementation used by the decoder.
//!
//! # Model
//!
//! * A parser is constructed over an immutable byte-buffer.
//! * Parsing is non-backtracking with at most one byte of lookahead
//!   ([`Parser::peek_byte`]); a consumed byte cannot be consumed again.
//! * `remainder()` is the largest `n` for which `consume(n)` succeeds, and a
//!   failed consume leaves the parser unchanged.

pub mod error;

use std::convert::Infallible;

pub use error::{ParseError, ParseResult};

use crate::error::HexConvError;
use crate::hexstring::HexString;

pub trait Parser {
    /// Total number of bytes in the buffer
    fn view_len(&self) -> usize;

    /// Number of bytes consumed so far
    fn offset(&self) -> usize;

    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Returns the next byte without consuming it
    fn peek_byte(&self) -> ParseResult<u8>;

    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Attempt to consume and return a slice of length `nbytes`,
    /// starting from the first unconsumed byte in the buffer.
    ///
    /// Must return `Ok(s)` with `s.len() == nbytes` exactly when
    /// `nbytes <= self.remainder()`.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.consume(N)?);
        Ok(arr)
    }

    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    /// Consumes two bytes and returns the corresponding big-endian `u16` value
    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        self.consume_arr::<2>().map(u16::from_be_bytes)
    }

    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_be_bytes)
    }

    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_be_bytes)
    }

    /// Consumes `n` bytes into a fresh vector
    fn take_dynamic(&mut self, n: usize) -> ParseResult<Vec<u8>> {
        Ok(self.consume(n)?.to_vec())
    }
}

/// Parser over an owned byte-vector with a monotone offset
#[derive(Debug, Clone)]
pub struct ByteParser {
    buffer: Vec<u8>,
    offset: usize,
}

impl ByteParser {
    #[must_use]
    pub fn new(buffer: Vec<u8>) -> Self {
        Self { buffer, offset: 0 }
    }

    fn overrun(&self, requested: usize) -> ParseError {
        ParseError::ConsumeWouldExceedLimit {
            offset: self.offset,
            requested,
            limit: self.buffer.len(),
        }
    }
}

impl Parser for ByteParser {
    fn view_len(&self) -> usize {
        self.buffer.len()
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn peek_byte(&self) -> ParseResult<u8> {
        self.buffer
            .get(self.offset)
            .copied()
            .ok_or_else(|| self.overrun(1))
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        let byte = self.peek_byte()?;
        self.offset += 1;
        Ok(byte)
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        if nbytes > self.remainder() {
            return Err(self.overrun(nbytes));
        }
        let start = self.offset;
        self.offset += nbytes;
        Ok(&self.buffer[start..self.offset])
    }
}

/// Fallible conversion of a byte source into a [`Parser`]
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    type Error;

    fn try_into_parser(self) -> Result<P, Self::Error>;
}

impl TryIntoParser for Vec<u8> {
    type Error = Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::new(self))
    }
}

impl TryIntoParser for &[u8] {
    type Error = Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::new(self.to_vec()))
    }
}

impl TryIntoParser for HexString {
    type Error = Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::new(self.into_vec()))
    }
}

impl TryIntoParser for &HexString {
    type Error = Infallible;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::new(self.as_bytes().to_vec()))
    }
}

impl TryIntoParser for &str {
    type Error = HexConvError;

    fn try_into_parser(self) -> Result<ByteParser, Self::Error> {
        Ok(ByteParser::new(HexString::from_hex(self)?.into_vec()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn consume_respects_limit() {
        let mut p = ByteParser::new(vec![0x01, 0x02, 0x03]);
        assert_eq!(p.take_u16().unwrap(), 0x0102);
        assert_eq!(p.remainder(), 1);
        assert_eq!(
            p.take_u16(),
            Err(ParseError::ConsumeWouldExceedLimit {
                offset: 2,
                requested: 2,
                limit: 3
            })
        );
        assert_eq!(p.offset(), 2);
        assert_eq!(p.peek_byte().unwrap(), 0x03);
        assert_eq!(p.take_u8().unwrap(), 0x03);
        assert!(p.peek_byte().is_err());
    }

    #[test]
    fn hex_source() {
        let mut p: ByteParser = "00ff".try_into_parser().unwrap();
        assert_eq!(p.take_dynamic(2).unwrap(), vec![0x00, 0xff]);
        assert!(<&str as TryIntoParser>::try_into_parser("0").is_err());
    }
}
