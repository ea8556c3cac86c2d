//! Tagged-JSON intermediate form
//!
//! [`TaggedJson`] is the hand-off format between the value model and a
//! canonical byte codec. Each node is a single-key JSON object:
//!
//! ```json
//! {"int": 42}
//! {"bytes": "cafe"}
//! {"list": [{"int": 1}]}
//! {"map": [{"k": {"bytes": ""}, "v": {"int": 0}}]}
//! {"constructor": 0, "fields": []}
//! ```
//!
//! Integers are written as JSON numbers when they fit in 64 bits and as
//! decimal strings otherwise; both forms are accepted when reading.

use std::convert::TryFrom;

use num_bigint::BigInt;
use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::data::{Constr, Data};
use crate::error::{DecodeError, DecodeResult};
use crate::hexstring::HexString;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TaggedJson {
    Int(BigInt),
    Bytes(HexString),
    List(Vec<TaggedJson>),
    Map(Vec<(TaggedJson, TaggedJson)>),
    Constructor { index: u64, fields: Vec<TaggedJson> },
}

impl TaggedJson {
    #[must_use]
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Integer(i) => TaggedJson::Int(i.clone()),
            Data::Bytes(b) => TaggedJson::Bytes(b.clone()),
            Data::List(xs) => TaggedJson::List(xs.iter().map(Self::from_data).collect()),
            Data::Map(kvs) => TaggedJson::Map(
                kvs.iter()
                    .map(|(k, v)| (Self::from_data(k), Self::from_data(v)))
                    .collect(),
            ),
            Data::Constr(Constr { index, fields }) => TaggedJson::Constructor {
                index: *index,
                fields: fields.iter().map(Self::from_data).collect(),
            },
        }
    }

    #[must_use]
    pub fn into_data(self) -> Data {
        match self {
            TaggedJson::Int(i) => Data::Integer(i),
            TaggedJson::Bytes(b) => Data::Bytes(b),
            TaggedJson::List(xs) => Data::List(xs.into_iter().map(Self::into_data).collect()),
            TaggedJson::Map(kvs) => Data::Map(
                kvs.into_iter()
                    .map(|(k, v)| (k.into_data(), v.into_data()))
                    .collect(),
            ),
            TaggedJson::Constructor { index, fields } => {
                Data::constr(index, fields.into_iter().map(Self::into_data).collect())
            }
        }
    }

    /// Renders `self` as a `serde_json` tree
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            TaggedJson::Int(i) => json!({ "int": int_to_json(i) }),
            TaggedJson::Bytes(b) => json!({ "bytes": b.to_hex() }),
            TaggedJson::List(xs) => {
                json!({ "list": xs.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            TaggedJson::Map(kvs) => json!({
                "map": kvs
                    .iter()
                    .map(|(k, v)| json!({ "k": k.to_json(), "v": v.to_json() }))
                    .collect::<Vec<_>>()
            }),
            TaggedJson::Constructor { index, fields } => json!({
                "constructor": index,
                "fields": fields.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

fn int_to_json(i: &BigInt) -> JsonValue {
    if let Ok(n) = i64::try_from(i) {
        JsonValue::from(n)
    } else if let Ok(n) = u64::try_from(i) {
        JsonValue::from(n)
    } else {
        JsonValue::String(i.to_string())
    }
}

fn int_of_json(v: &JsonValue) -> DecodeResult<BigInt> {
    match v {
        JsonValue::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from))
            .ok_or_else(|| DecodeError::Shape(format!("non-integral number {}", n))),
        JsonValue::String(s) => s
            .parse::<BigInt>()
            .map_err(|_| DecodeError::Shape(format!("`{}` is not a decimal integer", s))),
        other => Err(DecodeError::Shape(format!("expected integer, found {}", other))),
    }
}

fn array_of<'a>(obj: &'a JsonMap<String, JsonValue>, key: &str) -> DecodeResult<&'a Vec<JsonValue>> {
    obj.get(key)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| DecodeError::Shape(format!("`{}` must be an array", key)))
}

impl TryFrom<&JsonValue> for TaggedJson {
    type Error = DecodeError;

    fn try_from(v: &JsonValue) -> Result<Self, Self::Error> {
        let obj = v
            .as_object()
            .ok_or_else(|| DecodeError::Shape(format!("expected object, found {}", v)))?;
        if let Some(i) = obj.get("int") {
            return Ok(TaggedJson::Int(int_of_json(i)?));
        }
        if let Some(b) = obj.get("bytes") {
            let hex = b
                .as_str()
                .ok_or_else(|| DecodeError::Shape("`bytes` must be a hex string".into()))?;
            return Ok(TaggedJson::Bytes(HexString::from_hex(hex)?));
        }
        if obj.contains_key("list") {
            return array_of(obj, "list")?
                .iter()
                .map(TaggedJson::try_from)
                .collect::<DecodeResult<Vec<_>>>()
                .map(TaggedJson::List);
        }
        if obj.contains_key("map") {
            return array_of(obj, "map")?
                .iter()
                .map(|entry| match (entry.get("k"), entry.get("v")) {
                    (Some(k), Some(v)) => Ok((TaggedJson::try_from(k)?, TaggedJson::try_from(v)?)),
                    _ => Err(DecodeError::Shape("map entries need `k` and `v`".into())),
                })
                .collect::<DecodeResult<Vec<_>>>()
                .map(TaggedJson::Map);
        }
        if let Some(ix) = obj.get("constructor") {
            let index = ix
                .as_u64()
                .ok_or_else(|| DecodeError::Shape(format!("bad constructor index {}", ix)))?;
            let fields = array_of(obj, "fields")?
                .iter()
                .map(TaggedJson::try_from)
                .collect::<DecodeResult<Vec<_>>>()?;
            return Ok(TaggedJson::Constructor { index, fields });
        }
        Err(DecodeError::Shape(format!("no known tag in {}", v)))
    }
}

impl Serialize for TaggedJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaggedJson::Int(i) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("int", &int_to_json(i))?;
                map.end()
            }
            TaggedJson::Bytes(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bytes", b)?;
                map.end()
            }
            TaggedJson::List(xs) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("list", xs)?;
                map.end()
            }
            TaggedJson::Map(kvs) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("map", &Entries(kvs))?;
                map.end()
            }
            TaggedJson::Constructor { index, fields } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("constructor", index)?;
                map.serialize_entry("fields", fields)?;
                map.end()
            }
        }
    }
}

struct Entries<'a>(&'a [(TaggedJson, TaggedJson)]);

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (k, v) in self.0 {
            seq.serialize_element(&Entry(k, v))?;
        }
        seq.end()
    }
}

struct Entry<'a>(&'a TaggedJson, &'a TaggedJson);

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("k", self.0)?;
        map.serialize_entry("v", self.1)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaggedJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tree = JsonValue::deserialize(deserializer)?;
        TaggedJson::try_from(&tree).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;

    #[test]
    fn renders_every_tag() {
        let d = Data::constr(
            0,
            vec![
                Data::int(42),
                Data::Bytes(hex!("cafe")),
                Data::List(vec![Data::int(-1)]),
                Data::Map(vec![(Data::Bytes(HexString::new()), Data::int(0))]),
            ],
        );
        let expected = json!({
            "constructor": 0,
            "fields": [
                { "int": 42 },
                { "bytes": "cafe" },
                { "list": [{ "int": -1 }] },
                { "map": [{ "k": { "bytes": "" }, "v": { "int": 0 } }] },
            ]
        });
        let tagged = TaggedJson::from_data(&d);
        assert_eq!(tagged.to_json(), expected);
        assert_eq!(serde_json::to_value(&tagged).unwrap(), expected);
        assert_eq!(TaggedJson::try_from(&expected).unwrap().into_data(), d);
    }

    #[test]
    fn big_integers_as_strings() {
        let big: BigInt = "340282366920938463463374607431768211456".parse().unwrap();
        let j = TaggedJson::Int(big.clone()).to_json();
        assert_eq!(j, json!({ "int": "340282366920938463463374607431768211456" }));
        assert_eq!(TaggedJson::try_from(&j).unwrap(), TaggedJson::Int(big));
        let max = json!({ "int": u64::MAX });
        assert_eq!(
            TaggedJson::try_from(&max).unwrap(),
            TaggedJson::Int(BigInt::from(u64::MAX))
        );
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(TaggedJson::try_from(&json!({ "text": "hi" })).is_err());
        assert!(TaggedJson::try_from(&json!({ "bytes": "abc" })).is_err());
        assert!(TaggedJson::try_from(&json!({ "int": 1.5 })).is_err());
        assert!(TaggedJson::try_from(&json!({ "map": [{ "k": { "int": 1 } }] })).is_err());
        assert!(serde_json::from_str::<TaggedJson>(r#"{"constructor": -1, "fields": []}"#).is_err());
    }
}
