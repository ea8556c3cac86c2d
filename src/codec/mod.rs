//! Canonical transcoder
//!
//! Entry points that turn typed values into canonical hex and back:
//!
//! * [`to`] casts a [`Value`] under a schema and encodes the result;
//! * [`from`] decodes hex and casts the result back under a schema;
//! * [`to_data`] and [`from_data`] skip the cast and work on [`Data`] directly;
//! * [`void`] is the encoding of the empty constructor 0.
//!
//! `Data` travels to and from bytes through the [`TaggedJson`] intermediate
//! form and a [`CanonicalCodec`]. The default codec is [`PlutusCbor`]; the
//! `*_with` variants accept any other implementation.

pub mod cbor;
pub mod json;

use lazy_static::lazy_static;
use log::debug;

use crate::cast::{cast_from, cast_to};
use crate::conv::{Decode, Encode};
use crate::data::Data;
use crate::error::{DecodeResult, Result};
use crate::hexstring::HexString;
use crate::parse::ByteParser;
use crate::schema::Shape;
use crate::value::Value;

pub use json::TaggedJson;

/// Deepest nesting of lists, maps and constructors the decoder accepts
pub const MAX_DEPTH: usize = 256;

/// Byte-level half of the transcoder: tagged JSON to canonical bytes and back
pub trait CanonicalCodec {
    fn encode_canonical(&self, json: &TaggedJson) -> HexString;

    fn decode_canonical(&self, bytes: &HexString) -> DecodeResult<TaggedJson>;
}

/// Plutus `Data` CBOR, as accepted by the ledger
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PlutusCbor;

impl CanonicalCodec for PlutusCbor {
    fn encode_canonical(&self, json: &TaggedJson) -> HexString {
        json.encode::<HexString>()
    }

    fn decode_canonical(&self, bytes: &HexString) -> DecodeResult<TaggedJson> {
        TaggedJson::try_decode::<_, ByteParser>(bytes)
    }
}

lazy_static! {
    static ref VOID: HexString = to_data(&Data::void());
}

/// Canonical encoding of the empty constructor 0, `d87980`
#[must_use]
pub fn void() -> HexString {
    VOID.clone()
}

#[must_use]
pub fn to_data(data: &Data) -> HexString {
    to_data_with(&PlutusCbor, data)
}

pub fn to_data_with<C: CanonicalCodec + ?Sized>(codec: &C, data: &Data) -> HexString {
    debug!("encoding {}", data.describe());
    codec.encode_canonical(&TaggedJson::from_data(data))
}

/// Casts `value` under `shape` and encodes the result
pub fn to<S: Shape + ?Sized>(value: &Value, shape: &S) -> Result<HexString> {
    to_with(&PlutusCbor, value, shape)
}

pub fn to_with<C, S>(codec: &C, value: &Value, shape: &S) -> Result<HexString>
where
    C: CanonicalCodec + ?Sized,
    S: Shape + ?Sized,
{
    let data = cast_to(value, shape)?;
    Ok(to_data_with(codec, &data))
}

/// Decodes hex text into `Data`
pub fn from_data(raw: &str) -> Result<Data> {
    from_data_with(&PlutusCbor, raw)
}

pub fn from_data_with<C: CanonicalCodec + ?Sized>(codec: &C, raw: &str) -> Result<Data> {
    let bytes = HexString::from_hex(raw)?;
    debug!("decoding {} canonical bytes", bytes.len());
    Ok(codec.decode_canonical(&bytes)?.into_data())
}

/// Decodes hex text and casts the result under `shape`
pub fn from<S: Shape + ?Sized>(raw: &str, shape: &S) -> Result<Value> {
    from_with(&PlutusCbor, raw, shape)
}

pub fn from_with<C, S>(codec: &C, raw: &str, shape: &S) -> Result<Value>
where
    C: CanonicalCodec + ?Sized,
    S: Shape + ?Sized,
{
    let data = from_data_with(codec, raw)?;
    Ok(cast_from(&data, shape)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{CastError, DecodeError, Error};
    use crate::schema::Schema;

    #[test]
    fn void_is_fixed() {
        assert_eq!(void(), "d87980");
        assert_eq!(to(&Value::Unit, &Schema::void()).unwrap(), void());
        assert_eq!(from(void().to_hex().as_str(), &Schema::void()).unwrap(), Value::Unit);
    }

    #[test]
    fn typed_roundtrip() {
        let schema = Schema::nullable(Schema::integer());
        let hex = to(&Value::some(Value::int(5)), &schema).unwrap();
        assert_eq!(hex, "d8799f05ff");
        assert_eq!(from(&hex.to_hex(), &schema).unwrap(), Value::some(Value::int(5)));
    }

    #[test]
    fn errors_are_classified() {
        assert!(matches!(from_data("0"), Err(Error::Hex(_))));
        assert!(matches!(
            from_data("d87980ff"),
            Err(Error::Decode(DecodeError::NonEmpty { residual: 1 }))
        ));
        assert!(matches!(
            from("d87a80", &Schema::void()),
            Err(Error::Cast(CastError::ShapeMismatch { .. }))
        ));
    }

    /// Codec that only frames the tagged JSON text, to exercise the seam
    struct JsonText;

    impl CanonicalCodec for JsonText {
        fn encode_canonical(&self, json: &TaggedJson) -> HexString {
            HexString::from_text(&json.to_json().to_string())
        }

        fn decode_canonical(&self, bytes: &HexString) -> DecodeResult<TaggedJson> {
            let text = bytes
                .as_text()
                .ok_or_else(|| DecodeError::Shape("not utf-8".into()))?;
            serde_json::from_str(text).map_err(|e| DecodeError::Shape(e.to_string()))
        }
    }

    #[test]
    fn pluggable_codec() {
        let schema = Schema::boolean();
        let hex = to_with(&JsonText, &Value::Bool(true), &schema).unwrap();
        assert_eq!(hex.as_text(), Some(r#"{"constructor":1,"fields":[]}"#));
        assert_eq!(
            from_with(&JsonText, &hex.to_hex(), &schema).unwrap(),
            Value::Bool(true)
        );
    }
}
