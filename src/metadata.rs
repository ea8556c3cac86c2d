//! Transaction-metadata convention
//!
//! Auxiliary metadata attached to transactions is plain JSON, which is
//! mapped onto a subset of [`Data`]:
//!
//! * JSON strings are byte strings; a `0x` prefix marks the rest as raw hex,
//!   anything else is taken as UTF-8 text;
//! * JSON integers are integers, limited to the 64-bit range;
//! * arrays are lists and objects are maps whose keys are byte strings.
//!
//! Constructors have no metadata form, and only integers and byte strings can
//! become object keys.

use std::convert::TryFrom;

use num_bigint::BigInt;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::data::Data;
use crate::error::MetadataError;
use crate::hexstring::HexString;

const RAW_PREFIX: &str = "0x";

fn bytes_of_str(s: &str) -> Result<Data, MetadataError> {
    Ok(Data::Bytes(match s.strip_prefix(RAW_PREFIX) {
        Some(hex) => HexString::from_hex(hex)?,
        None => HexString::from_text(s),
    }))
}

/// Lifts metadata JSON into `Data`
///
/// # Errors
///
/// `null`, booleans and non-integral numbers are rejected with
/// [`MetadataError::UnsupportedType`]; a `0x` string with invalid hex after
/// the prefix yields [`MetadataError::Hex`].
pub fn from_metadata(json: &JsonValue) -> Result<Data, MetadataError> {
    match json {
        JsonValue::String(s) => bytes_of_str(s),
        JsonValue::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from))
            .map(Data::Integer)
            .ok_or_else(|| MetadataError::UnsupportedType(format!("number {}", n))),
        JsonValue::Array(xs) => xs
            .iter()
            .map(from_metadata)
            .collect::<Result<Vec<_>, _>>()
            .map(Data::List),
        JsonValue::Object(obj) => obj
            .iter()
            .map(|(k, v)| Ok((bytes_of_str(k)?, from_metadata(v)?)))
            .collect::<Result<Vec<_>, MetadataError>>()
            .map(Data::Map),
        JsonValue::Bool(_) => Err(MetadataError::UnsupportedType("boolean".into())),
        JsonValue::Null => Err(MetadataError::UnsupportedType("null".into())),
    }
}

fn int_to_json(i: &BigInt) -> Result<JsonValue, MetadataError> {
    i64::try_from(i)
        .map(JsonValue::from)
        .or_else(|_| u64::try_from(i).map(JsonValue::from))
        .map_err(|_| MetadataError::OutOfRange(i.clone()))
}

/// Text when the bytes are UTF-8 that cannot be mistaken for raw hex,
/// `0x`-prefixed hex otherwise
fn str_of_bytes(b: &HexString) -> String {
    match b.as_text() {
        Some(text) if !text.starts_with(RAW_PREFIX) => text.to_owned(),
        _ => format!("{}{}", RAW_PREFIX, b.to_hex()),
    }
}

/// Renders `Data` as metadata JSON
///
/// # Errors
///
/// * [`MetadataError::UnsupportedType`] for constructors, and for map keys
///   that are neither integers nor byte strings.
/// * [`MetadataError::OutOfRange`] for integers beyond 64 bits.
pub fn to_metadata(data: &Data) -> Result<JsonValue, MetadataError> {
    match data {
        Data::Integer(i) => int_to_json(i),
        Data::Bytes(b) => Ok(JsonValue::String(str_of_bytes(b))),
        Data::List(xs) => xs
            .iter()
            .map(to_metadata)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Data::Map(kvs) => {
            let mut obj = JsonMap::with_capacity(kvs.len());
            for (k, v) in kvs {
                let key = match k {
                    Data::Integer(i) => i.to_string(),
                    Data::Bytes(b) => str_of_bytes(b),
                    other => {
                        return Err(MetadataError::UnsupportedType(format!(
                            "{} as object key, only bytes or integers can be keys",
                            other.kind()
                        )))
                    }
                };
                obj.insert(key, to_metadata(v)?);
            }
            Ok(JsonValue::Object(obj))
        }
        Data::Constr(_) => Err(MetadataError::UnsupportedType(
            "constructor cannot be converted to metadata".into(),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;
    use serde_json::json;

    #[test]
    fn text_and_raw_bytes() {
        assert_eq!(
            from_metadata(&json!("hi")).unwrap(),
            Data::Bytes(HexString::from_text("hi"))
        );
        assert_eq!(from_metadata(&json!("0xcafe")).unwrap(), Data::Bytes(hex!("cafe")));
        assert!(matches!(from_metadata(&json!("0xcaf")), Err(MetadataError::Hex(_))));
        assert_eq!(to_metadata(&Data::Bytes(HexString::from_text("hi"))).unwrap(), json!("hi"));
        assert_eq!(to_metadata(&Data::Bytes(hex!("ff00"))).unwrap(), json!("0xff00"));
        // text that itself looks raw keeps its prefix unambiguous
        let tricky = Data::Bytes(HexString::from_text("0xab"));
        let rendered = to_metadata(&tricky).unwrap();
        assert_eq!(rendered, json!("0x30786162"));
        assert_eq!(from_metadata(&rendered).unwrap(), tricky);
    }

    #[test]
    fn nested_document() {
        let doc = json!({
            "name": "token",
            "amounts": [1, -2, 18446744073709551615u64],
            "0x01": { "inner": [] }
        });
        let data = from_metadata(&doc).unwrap();
        let Data::Map(ref kvs) = data else {
            panic!("expected map")
        };
        assert_eq!(kvs[0].0, Data::Bytes(HexString::from_text("name")));
        assert_eq!(kvs[2].0, Data::Bytes(hex!("01")));
        let back = to_metadata(&data).unwrap();
        assert_eq!(back["amounts"], json!([1, -2, 18446744073709551615u64]));
        assert_eq!(back["name"], json!("token"));
        assert_eq!(back["0x01"], json!({ "inner": [] }));
    }

    #[test]
    fn integer_keys_render_as_strings() {
        let data = Data::Map(vec![(Data::int(721), Data::int(1))]);
        assert_eq!(to_metadata(&data).unwrap(), json!({ "721": 1 }));
    }

    #[test]
    fn unsupported_shapes() {
        assert!(matches!(
            to_metadata(&Data::void()),
            Err(MetadataError::UnsupportedType(_))
        ));
        assert!(matches!(
            to_metadata(&Data::Map(vec![(Data::List(vec![]), Data::int(0))])),
            Err(MetadataError::UnsupportedType(_))
        ));
        let huge = Data::Integer(BigInt::from(u64::MAX) + 1);
        assert!(matches!(to_metadata(&huge), Err(MetadataError::OutOfRange(_))));
        assert!(from_metadata(&json!(1.5)).is_err());
        assert!(from_metadata(&json!(null)).is_err());
        assert!(from_metadata(&json!(true)).is_err());
    }
}
