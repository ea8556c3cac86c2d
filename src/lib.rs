//! Schema-driven transcoding between typed values and Plutus Data
//!
//! # Overview
//!
//! On-chain values in Plutus are expressed in a single untyped representation,
//! [`Data`]: integers, byte strings, lists, key/value maps and indexed
//! constructors. Applications, on the other hand, think in records, tagged
//! enums, booleans and optional values. This crate bridges the two.
//!
//! A [`Schema`] describes how a typed [`Value`] is laid out in `Data`. It is
//! built once, either through the combinators on [`Schema`] or by reading
//! blueprint JSON with [`blueprint::parse_schema`], and can then be shared by
//! any number of casts:
//!
//! * [`cast_to`] folds a `Value` into `Data`, checking shape and constraints;
//! * [`cast_from`] lifts `Data` back into a `Value`;
//! * [`to`] and [`from`] compose the cast with the canonical byte encoding,
//!   producing and consuming hex text.
//!
//! ```
//! use pdata::{from, to, EnumItem, Schema, Value};
//!
//! let action = Schema::enumeration(vec![
//!     EnumItem::named("Spend", vec![("amount", Schema::integer())]),
//!     EnumItem::from("Cancel"),
//! ])?;
//! let spend = Value::named("Spend", [("amount", Value::int(5))]);
//!
//! let hex = to(&spend, &action)?;
//! assert_eq!(hex, "d8799f05ff");
//! assert_eq!(from(&hex.to_hex(), &action)?, spend);
//! # Ok::<(), pdata::Error>(())
//! ```
//!
//! Booleans, nullables and tuples are folded into constructors by convention;
//! see [`cast`] for the full correspondence.
//!
//! # Layers
//!
//! From the bottom up:
//!
//! * [`hexstring`], [`data`] and [`value`] hold the two value models;
//! * [`schema`], [`blueprint`] and [`constraint`] describe and check shapes;
//! * [`cast`] is the structural cast engine;
//! * [`codec`] lowers `Data` to tagged JSON and on to canonical CBOR through
//!   the [`conv`] and [`parse`] byte layers;
//! * [`metadata`] implements the separate JSON convention used for
//!   transaction metadata.
//!
//! # Features
//!
//! * `check_canonical`: the decoder rejects integer and length heads that are
//!   not written in their shortest form.
//!
//! The crate logs through the [`log`] facade (`trace` inside the cast engine,
//! `debug` at codec entry points) and never installs a logger itself.

pub mod blueprint;
pub mod cast;
pub mod codec;
pub mod constraint;
pub mod conv;
pub mod data;
pub mod error;
pub mod hexstring;
pub mod metadata;
pub mod parse;
pub mod schema;
pub mod value;

pub use crate::cast::{cast_from, cast_to};
pub use crate::codec::{
    from, from_data, from_with, to, to_data, to_with, void, CanonicalCodec, PlutusCbor,
    TaggedJson,
};
pub use crate::conv::{target::Target, Decode, Encode};
pub use crate::data::{Constr, Data};
pub use crate::error::{Error, Result};
pub use crate::hexstring::HexString;
pub use crate::metadata::{from_metadata, to_metadata};
pub use crate::parse::{ByteParser, ParseError, ParseResult, Parser, TryIntoParser};
pub use crate::schema::{Definitions, Document, EnumItem, Schema, Shape};
pub use crate::value::{Payload, Record, Value, Variant};
