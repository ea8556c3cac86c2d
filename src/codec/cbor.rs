//! Plutus-flavoured canonical CBOR
//!
//! Byte-level [`Encode`] and [`Decode`] implementations for [`TaggedJson`],
//! following the conventions the Plutus ledger uses for `Data`:
//!
//! * integers within 64 bits use major types 0 and 1, larger ones the
//!   positive/negative bignum tags 2 and 3;
//! * byte strings longer than 64 bytes are written indefinite-length, in
//!   64-byte chunks;
//! * non-empty lists are written indefinite-length, maps definite-length;
//! * constructor `i` is tag `121 + i` for `i < 7`, tag `1280 + (i - 7)` for
//!   `i < 128`, and tag 102 over `[i, fields]` beyond that.
//!
//! The decoder accepts every form the encoder can emit plus their definite or
//! indefinite counterparts. With the `check_canonical` feature it also
//! rejects heads that are not in their shortest form.

use std::convert::TryFrom;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::parse::error::{ParseError, ParseResult, TokenError};
use crate::parse::Parser;

use super::json::TaggedJson;
use super::MAX_DEPTH;

const MAJOR_UINT: u8 = 0;
const MAJOR_NINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_LIST: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xff;

/// Widest byte-string chunk written in one piece
const CHUNK: usize = 64;

const TAG_BIGNUM_POS: u64 = 2;
const TAG_BIGNUM_NEG: u64 = 3;
const TAG_CONSTR_ANY: u64 = 102;
const TAG_CONSTR_SMALL: u64 = 121;
const TAG_CONSTR_LARGE: u64 = 1280;

fn write_bytes<U: Target>(bytes: &[u8], buf: &mut U) -> usize {
    if bytes.len() <= CHUNK {
        buf.anticipate(bytes.len() + 9);
        return buf.push_head(MAJOR_BYTES, bytes.len() as u64) + buf.push_all(bytes);
    }
    buf.anticipate(bytes.len() + 2 * Integer::div_ceil(&bytes.len(), &CHUNK) + 2);
    let mut n = buf.push_one((MAJOR_BYTES << 5) | INDEFINITE);
    for chunk in bytes.chunks(CHUNK) {
        n += buf.push_head(MAJOR_BYTES, chunk.len() as u64) + buf.push_all(chunk);
    }
    n + buf.push_one(BREAK)
}

fn write_int<U: Target>(i: &BigInt, buf: &mut U) -> usize {
    if let Ok(u) = u64::try_from(i) {
        return buf.push_head(MAJOR_UINT, u);
    }
    // -1 - i, the magnitude carried by negative encodings
    let neg: BigInt = -(i + 1u8);
    match (i.sign(), u64::try_from(&neg)) {
        (Sign::Minus, Ok(u)) => buf.push_head(MAJOR_NINT, u),
        (Sign::Minus, Err(_)) => {
            buf.push_head(MAJOR_TAG, TAG_BIGNUM_NEG) + write_bytes(&neg.to_bytes_be().1, buf)
        }
        _ => buf.push_head(MAJOR_TAG, TAG_BIGNUM_POS) + write_bytes(&i.to_bytes_be().1, buf),
    }
}

fn write_list<U: Target>(xs: &[TaggedJson], buf: &mut U) -> usize {
    if xs.is_empty() {
        return buf.push_head(MAJOR_LIST, 0);
    }
    let mut n = buf.push_one((MAJOR_LIST << 5) | INDEFINITE);
    for x in xs {
        n += x.write_to(buf);
    }
    n + buf.push_one(BREAK)
}

impl Encode for TaggedJson {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            TaggedJson::Int(i) => write_int(i, buf),
            TaggedJson::Bytes(b) => write_bytes(b.as_bytes(), buf),
            TaggedJson::List(xs) => write_list(xs, buf),
            TaggedJson::Map(kvs) => {
                let mut n = buf.push_head(MAJOR_MAP, kvs.len() as u64);
                for (k, v) in kvs {
                    n += k.write_to(buf) + v.write_to(buf);
                }
                n
            }
            TaggedJson::Constructor { index, fields } => match *index {
                ix @ 0..=6 => {
                    buf.push_head(MAJOR_TAG, TAG_CONSTR_SMALL + ix) + write_list(fields, buf)
                }
                ix @ 7..=127 => {
                    buf.push_head(MAJOR_TAG, TAG_CONSTR_LARGE + ix - 7) + write_list(fields, buf)
                }
                ix => {
                    buf.push_head(MAJOR_TAG, TAG_CONSTR_ANY)
                        + buf.push_head(MAJOR_LIST, 2)
                        + buf.push_head(MAJOR_UINT, ix)
                        + write_list(fields, buf)
                }
            },
        }
    }
}

/// Argument of a CBOR head
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Arg {
    Definite(u64),
    Indefinite,
}

struct Head {
    major: u8,
    arg: Arg,
    offset: usize,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "check_canonical")] {
        fn check_minimal(info: u8, arg: u64, offset: usize) -> ParseResult<()> {
            let minimal = match info {
                24 => arg >= 24,
                25 => arg > 0xff,
                26 => arg > 0xffff,
                27 => arg > 0xffff_ffff,
                _ => true,
            };
            if minimal {
                Ok(())
            } else {
                Err(TokenError::NonMinimal { offset }.into())
            }
        }
    } else {
        #[inline(always)]
        fn check_minimal(_info: u8, _arg: u64, _offset: usize) -> ParseResult<()> {
            Ok(())
        }
    }
}

fn take_head<P: Parser>(p: &mut P) -> ParseResult<Head> {
    let offset = p.offset();
    let byte = p.take_u8()?;
    let (major, info) = (byte >> 5, byte & 0x1f);
    let arg = match info {
        0..=23 => Arg::Definite(u64::from(info)),
        24 => Arg::Definite(u64::from(p.take_u8()?)),
        25 => Arg::Definite(u64::from(p.take_u16()?)),
        26 => Arg::Definite(u64::from(p.take_u32()?)),
        27 => Arg::Definite(p.take_u64()?),
        INDEFINITE if matches!(major, MAJOR_BYTES | MAJOR_LIST | MAJOR_MAP) => Arg::Indefinite,
        INDEFINITE if byte == BREAK => return Err(TokenError::StrayBreak { offset }.into()),
        _ => return Err(TokenError::ReservedInfo { byte, offset }.into()),
    };
    if let Arg::Definite(n) = arg {
        check_minimal(info, n, offset)?;
    }
    Ok(Head { major, arg, offset })
}

fn to_len(n: u64, offset: usize) -> ParseResult<usize> {
    usize::try_from(n).map_err(|_| TokenError::Overflow { offset }.into())
}

/// Consumes a break byte if it is next
fn at_break<P: Parser>(p: &mut P) -> ParseResult<bool> {
    if p.peek_byte()? == BREAK {
        p.consume_byte()?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn unexpected(expected: &'static str, head: &Head) -> ParseError {
    TokenError::UnexpectedMajor {
        expected,
        found: head.major,
        offset: head.offset,
    }
    .into()
}

/// Reads the body of a byte string whose head has already been consumed
fn take_bytes<P: Parser>(p: &mut P, head: &Head) -> ParseResult<Vec<u8>> {
    match head.arg {
        Arg::Definite(n) => p.take_dynamic(to_len(n, head.offset)?),
        Arg::Indefinite => {
            let mut out = Vec::new();
            while !at_break(p)? {
                let chunk = take_head(p)?;
                match (chunk.major, chunk.arg) {
                    (MAJOR_BYTES, Arg::Definite(n)) => {
                        out.extend_from_slice(p.consume(to_len(n, chunk.offset)?)?)
                    }
                    _ => return Err(TokenError::InvalidChunk { offset: chunk.offset }.into()),
                }
            }
            Ok(out)
        }
    }
}

/// Reads `count` items, or items up to a break when `count` is indefinite
fn take_items<P: Parser>(p: &mut P, head: &Head, depth: usize) -> ParseResult<Vec<TaggedJson>> {
    match head.arg {
        Arg::Definite(n) => {
            let n = to_len(n, head.offset)?;
            let mut xs = Vec::with_capacity(n.min(p.remainder()));
            for _ in 0..n {
                xs.push(take_item(p, depth)?);
            }
            Ok(xs)
        }
        Arg::Indefinite => {
            let mut xs = Vec::new();
            while !at_break(p)? {
                xs.push(take_item(p, depth)?);
            }
            Ok(xs)
        }
    }
}

fn take_list<P: Parser>(p: &mut P, depth: usize) -> ParseResult<Vec<TaggedJson>> {
    let head = take_head(p)?;
    if head.major != MAJOR_LIST {
        return Err(unexpected("list of constructor fields", &head));
    }
    take_items(p, &head, depth)
}

fn take_tagged<P: Parser>(p: &mut P, head: &Head, depth: usize) -> ParseResult<TaggedJson> {
    let tag = match head.arg {
        Arg::Definite(tag) => tag,
        Arg::Indefinite => return Err(unexpected("tag", head)),
    };
    match tag {
        TAG_BIGNUM_POS | TAG_BIGNUM_NEG => {
            let inner = take_head(p)?;
            if inner.major != MAJOR_BYTES {
                return Err(unexpected("bignum bytes", &inner));
            }
            let n = BigInt::from_bytes_be(Sign::Plus, &take_bytes(p, &inner)?);
            Ok(TaggedJson::Int(if tag == TAG_BIGNUM_POS { n } else { -1 - n }))
        }
        121..=127 => Ok(TaggedJson::Constructor {
            index: tag - TAG_CONSTR_SMALL,
            fields: take_list(p, depth)?,
        }),
        1280..=1400 => Ok(TaggedJson::Constructor {
            index: tag - TAG_CONSTR_LARGE + 7,
            fields: take_list(p, depth)?,
        }),
        TAG_CONSTR_ANY => {
            let offset = p.offset();
            let pair = take_head(p)?;
            if pair.major != MAJOR_LIST {
                return Err(TokenError::MalformedConstr { offset }.into());
            }
            match take_items(p, &pair, depth)?.as_mut_slice() {
                [TaggedJson::Int(ix), TaggedJson::List(fields)] => Ok(TaggedJson::Constructor {
                    index: u64::try_from(&*ix)
                        .map_err(|_| ParseError::from(TokenError::MalformedConstr { offset }))?,
                    fields: std::mem::take(fields),
                }),
                _ => Err(TokenError::MalformedConstr { offset }.into()),
            }
        }
        tag => Err(TokenError::UnsupportedTag {
            tag,
            offset: head.offset,
        }
        .into()),
    }
}

fn take_item<P: Parser>(p: &mut P, depth: usize) -> ParseResult<TaggedJson> {
    if depth >= MAX_DEPTH {
        return Err(ParseError::DepthExceeded { limit: MAX_DEPTH });
    }
    let head = take_head(p)?;
    match (head.major, head.arg) {
        (MAJOR_UINT, Arg::Definite(n)) => Ok(TaggedJson::Int(BigInt::from(n))),
        (MAJOR_NINT, Arg::Definite(n)) => Ok(TaggedJson::Int(-1 - BigInt::from(n))),
        (MAJOR_BYTES, _) => Ok(TaggedJson::Bytes(take_bytes(p, &head)?.into())),
        (MAJOR_LIST, _) => Ok(TaggedJson::List(take_items(p, &head, depth + 1)?)),
        (MAJOR_MAP, _) => {
            let flat = match head.arg {
                Arg::Definite(n) => {
                    let n = n
                        .checked_mul(2)
                        .ok_or(TokenError::Overflow { offset: head.offset })?;
                    take_items(p, &Head { arg: Arg::Definite(n), ..head }, depth + 1)?
                }
                Arg::Indefinite => take_map_entries(p, depth + 1)?,
            };
            let mut kvs = Vec::with_capacity(flat.len() / 2);
            let mut it = flat.into_iter();
            while let (Some(k), Some(v)) = (it.next(), it.next()) {
                kvs.push((k, v));
            }
            Ok(TaggedJson::Map(kvs))
        }
        (MAJOR_TAG, _) => take_tagged(p, &head, depth + 1),
        _ => Err(unexpected("plutus data", &head)),
    }
}

/// Reads key/value pairs of an indefinite map, flattened
fn take_map_entries<P: Parser>(p: &mut P, depth: usize) -> ParseResult<Vec<TaggedJson>> {
    let mut flat = Vec::new();
    while !at_break(p)? {
        flat.push(take_item(p, depth)?);
        flat.push(take_item(p, depth)?);
    }
    Ok(flat)
}

impl Decode for TaggedJson {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        take_item(p, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conv::EncodeLength;
    use crate::error::DecodeError;
    use crate::hexstring::HexString;

    fn enc(t: &TaggedJson) -> String {
        let bytes = t.to_bytes();
        assert_eq!(bytes.len(), t.enc_len());
        HexString::from_vec(bytes).to_hex()
    }

    fn dec(hex: &str) -> TaggedJson {
        TaggedJson::try_decode::<_, crate::parse::ByteParser>(hex).unwrap()
    }

    fn constr(index: u64, fields: Vec<TaggedJson>) -> TaggedJson {
        TaggedJson::Constructor { index, fields }
    }

    fn int(i: i64) -> TaggedJson {
        TaggedJson::Int(BigInt::from(i))
    }

    #[test]
    fn void_constructor() {
        assert_eq!(enc(&constr(0, vec![])), "d87980");
        assert_eq!(dec("d87980"), constr(0, vec![]));
    }

    #[test]
    fn constructor_tags() {
        assert_eq!(enc(&constr(1, vec![int(5)])), "d87a9f05ff");
        assert_eq!(enc(&constr(6, vec![])), "d87f80");
        assert_eq!(enc(&constr(7, vec![])), "d9050080");
        assert_eq!(enc(&constr(127, vec![])), "d9057880");
        assert_eq!(enc(&constr(128, vec![])), "d8668218 8080".replace(' ', ""));
        for ix in [0, 6, 7, 127, 128, 1000] {
            let c = constr(ix, vec![int(1)]);
            assert_eq!(dec(&enc(&c)), c);
        }
        // definite-length fields
        assert_eq!(dec("d8798105"), constr(0, vec![int(5)]));
    }

    #[test]
    fn integers() {
        assert_eq!(enc(&int(0)), "00");
        assert_eq!(enc(&int(-1)), "20");
        assert_eq!(enc(&int(1000)), "1903e8");
        assert_eq!(enc(&int(-1000)), "3903e7");
        let max = TaggedJson::Int(BigInt::from(u64::MAX));
        assert_eq!(enc(&max), "1bffffffffffffffff");
        let min = TaggedJson::Int(-1 - BigInt::from(u64::MAX));
        assert_eq!(enc(&min), "3bffffffffffffffff");
        let big = TaggedJson::Int(BigInt::from(u64::MAX) + 1);
        assert_eq!(enc(&big), "c249010000000000000000");
        let neg_big = TaggedJson::Int(-2 - BigInt::from(u64::MAX));
        assert_eq!(enc(&neg_big), "c349010000000000000000");
        for t in [max, min, big, neg_big] {
            assert_eq!(dec(&enc(&t)), t);
        }
    }

    #[test]
    fn long_bytes_are_chunked() {
        let short = TaggedJson::Bytes(HexString::from_vec(vec![0xaa; 64]));
        assert!(enc(&short).starts_with("5840"));
        let long = TaggedJson::Bytes(HexString::from_vec(vec![0xaa; 65]));
        let hex = enc(&long);
        assert!(hex.starts_with("5f5840"));
        assert!(hex.ends_with("41aaff"));
        assert_eq!(dec(&hex), long);
    }

    #[test]
    fn lists_and_maps() {
        assert_eq!(enc(&TaggedJson::List(vec![])), "80");
        assert_eq!(enc(&TaggedJson::List(vec![int(1), int(2)])), "9f0102ff");
        assert_eq!(dec("820102"), TaggedJson::List(vec![int(1), int(2)]));
        let m = TaggedJson::Map(vec![(int(1), TaggedJson::Bytes(HexString::new()))]);
        assert_eq!(enc(&m), "a10140");
        assert_eq!(dec("bf0140ff"), m);
    }

    #[test]
    fn rejects_malformed_input() {
        let err = |hex: &str| TaggedJson::try_decode::<_, crate::parse::ByteParser>(hex).unwrap_err();
        assert_eq!(err("0001"), DecodeError::NonEmpty { residual: 1 });
        assert!(matches!(
            err("ff"),
            DecodeError::Parse(ParseError::Token(TokenError::StrayBreak { offset: 0 }))
        ));
        assert!(matches!(
            err("6161"),
            DecodeError::Parse(ParseError::Token(TokenError::UnexpectedMajor { .. }))
        ));
        assert!(matches!(
            err("c100"),
            DecodeError::Parse(ParseError::Token(TokenError::UnsupportedTag { tag: 1, .. }))
        ));
        assert!(matches!(
            err("5f01ff"),
            DecodeError::Parse(ParseError::Token(TokenError::InvalidChunk { .. }))
        ));
        assert!(matches!(err("9f01"), DecodeError::Parse(ParseError::ConsumeWouldExceedLimit { .. })));
        assert!(matches!(err("1c"), DecodeError::Parse(ParseError::Token(TokenError::ReservedInfo { .. }))));
    }

    #[test]
    fn bounded_depth() {
        let deep = "81".repeat(MAX_DEPTH + 1) + "00";
        assert!(matches!(
            TaggedJson::try_decode::<_, crate::parse::ByteParser>(deep.as_str()),
            Err(DecodeError::Parse(ParseError::DepthExceeded { .. }))
        ));
        let ok = "81".repeat(MAX_DEPTH - 1) + "00";
        assert!(TaggedJson::try_decode::<_, crate::parse::ByteParser>(ok.as_str()).is_ok());
    }

    #[cfg(feature = "check_canonical")]
    #[test]
    fn non_minimal_heads() {
        let err = TaggedJson::try_decode::<_, crate::parse::ByteParser>("1801").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Parse(ParseError::Token(TokenError::NonMinimal { offset: 0 }))
        ));
    }
}
