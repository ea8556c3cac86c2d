//! Untyped Plutus Data
//!
//! [`Data`] is the universal tagged representation of on-chain values: exactly
//! one of an arbitrary-precision integer, a byte string, a list, a key/value
//! map, or an indexed constructor. The cast engine produces it from typed
//! [`Value`](crate::Value)s and the canonical codec turns it into bytes.
//!
//! Map entries are kept as an ordered sequence of pairs; keys are not required
//! to be unique at this level.

use num_bigint::BigInt;

use crate::error::HexConvError;
use crate::hexstring::HexString;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Data {
    Integer(BigInt),
    Bytes(HexString),
    List(Vec<Data>),
    Map(Vec<(Data, Data)>),
    Constr(Constr),
}

/// Constructor application: a non-negative index paired with its fields
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Constr {
    pub index: u64,
    pub fields: Vec<Data>,
}

impl Constr {
    #[must_use]
    pub fn new(index: u64, fields: Vec<Data>) -> Self {
        Self { index, fields }
    }

    /// The empty constructor at index 0, used as a payload-less datum or redeemer
    #[must_use]
    pub const fn void() -> Self {
        Self {
            index: 0,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.index == 0 && self.fields.is_empty()
    }
}

impl Data {
    #[must_use]
    pub fn int(i: impl Into<BigInt>) -> Self {
        Data::Integer(i.into())
    }

    /// Parses `hex` into a byte-string leaf
    pub fn bytes(hex: &str) -> Result<Self, HexConvError> {
        Ok(Data::Bytes(HexString::from_hex(hex)?))
    }

    #[must_use]
    pub fn constr(index: u64, fields: Vec<Data>) -> Self {
        Data::Constr(Constr::new(index, fields))
    }

    #[must_use]
    pub const fn void() -> Self {
        Data::Constr(Constr::void())
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Data::Constr(c) if c.is_void())
    }

    /// Name of the active variant, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Data::Integer(_) => "integer",
            Data::Bytes(_) => "bytes",
            Data::List(_) => "list",
            Data::Map(_) => "map",
            Data::Constr(_) => "constructor",
        }
    }

    /// Short description of the node including its size or index
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Data::Integer(i) => format!("integer {}", i),
            Data::Bytes(b) => format!("{}-byte string", b.len()),
            Data::List(xs) => format!("list of {} elements", xs.len()),
            Data::Map(kvs) => format!("map of {} entries", kvs.len()),
            Data::Constr(c) => {
                format!("constructor {} with {} fields", c.index, c.fields.len())
            }
        }
    }
}

impl From<BigInt> for Data {
    fn from(i: BigInt) -> Self {
        Data::Integer(i)
    }
}

macro_rules! impl_from_prim {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Data {
                fn from(i: $t) -> Self {
                    Data::Integer(BigInt::from(i))
                }
            }
        )*
    };
}

impl_from_prim!(i32, i64, u32, u64, i128, u128);

impl From<HexString> for Data {
    fn from(b: HexString) -> Self {
        Data::Bytes(b)
    }
}

impl From<Constr> for Data {
    fn from(c: Constr) -> Self {
        Data::Constr(c)
    }
}

impl From<Vec<Data>> for Data {
    fn from(xs: Vec<Data>) -> Self {
        Data::List(xs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;
    use std::collections::HashSet;

    #[test]
    fn void_shape() {
        assert!(Data::void().is_void());
        assert!(!Data::constr(1, vec![]).is_void());
        assert!(!Data::constr(0, vec![Data::int(0)]).is_void());
    }

    #[test]
    fn structural_hash() {
        let a = Data::constr(0, vec![Data::Bytes(hex!("aa")), Data::int(1)]);
        let b = Data::constr(0, vec![Data::Bytes(hex!("AA")), Data::int(1)]);
        let set: HashSet<&Data> = [&a, &b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn describe_nodes() {
        assert_eq!(Data::constr(3, vec![Data::int(0)]).describe(), "constructor 3 with 1 fields");
        assert_eq!(Data::bytes("0011").unwrap().describe(), "2-byte string");
        assert_eq!(Data::Map(vec![]).kind(), "map");
    }
}
