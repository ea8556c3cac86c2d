//! Blueprint JSON
//!
//! Schemas are commonly exchanged as JSON documents in the shape used by
//! Plutus blueprints (`plutus.json`):
//!
//! ```json
//! {
//!   "dataType": "list",
//!   "items": { "$ref": "#/definitions/Asset" },
//!   "minItems": 1
//! }
//! ```
//!
//! [`parse_schema`] reads one node (recursively), [`render_schema`] writes one
//! back, and [`Document::from_json`] reads a root schema together with its
//! `definitions`. Parsing applies the same naming checks as the builders, so
//! a parsed schema is indistinguishable from a built one.
//!
//! Nodes carrying none of `dataType`, `anyOf` or `$ref` are read as
//! [`Schema::Any`].

use std::convert::TryFrom;

use num_bigint::BigInt;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::error::SchemaError;
use crate::hexstring::HexString;
use crate::schema::{
    BytesSchema, ConstructorSchema, Definitions, Document, EnumSchema, Field, FieldName,
    IntegerSchema, Items, ListSchema, MapSchema, Schema, Tag,
};

const REF_PREFIX: &str = "#/definitions/";

type Object = JsonMap<String, JsonValue>;

fn malformed(reason: impl Into<String>) -> SchemaError {
    SchemaError::Malformed(reason.into())
}

fn as_object<'a>(json: &'a JsonValue, what: &str) -> Result<&'a Object, SchemaError> {
    json.as_object()
        .ok_or_else(|| malformed(format!("{} must be an object, found {}", what, json)))
}

fn opt_usize(obj: &Object, key: &str) -> Result<Option<usize>, SchemaError> {
    obj.get(key)
        .map(|v| {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| malformed(format!("`{}` must be a non-negative integer", key)))
        })
        .transpose()
}

fn opt_bigint(obj: &Object, key: &str) -> Result<Option<BigInt>, SchemaError> {
    obj.get(key)
        .map(|v| match v {
            JsonValue::Number(n) => n
                .as_i64()
                .map(BigInt::from)
                .or_else(|| n.as_u64().map(BigInt::from)),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        })
        .map(|v| v.ok_or_else(|| malformed(format!("`{}` must be an integer", key))))
        .transpose()
}

fn opt_bool(obj: &Object, key: &str) -> Result<Option<bool>, SchemaError> {
    obj.get(key)
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| malformed(format!("`{}` must be a boolean", key)))
        })
        .transpose()
}

fn opt_str<'a>(obj: &'a Object, key: &str) -> Result<Option<&'a str>, SchemaError> {
    obj.get(key)
        .map(|v| {
            v.as_str()
                .ok_or_else(|| malformed(format!("`{}` must be a string", key)))
        })
        .transpose()
}

/// Decodes the definition name of a `#/definitions/...` pointer
fn ref_name(pointer: &str) -> Result<String, SchemaError> {
    pointer
        .strip_prefix(REF_PREFIX)
        .map(|name| name.replace("~1", "/").replace("~0", "~"))
        .ok_or_else(|| malformed(format!("unsupported reference `{}`", pointer)))
}

fn ref_pointer(name: &str) -> String {
    format!("{}{}", REF_PREFIX, name.replace('~', "~0").replace('/', "~1"))
}

fn parse_constructor(json: &JsonValue) -> Result<ConstructorSchema, SchemaError> {
    let obj = as_object(json, "constructor")?;
    match opt_str(obj, "dataType")? {
        Some("constructor") => {}
        _ => return Err(malformed("`anyOf` entries must have dataType `constructor`")),
    }
    let index = obj
        .get("index")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| malformed("constructor requires a non-negative `index`"))?;
    let title = opt_str(obj, "title")?.map(Tag::new).transpose()?;
    let fields = match obj.get("fields") {
        Some(JsonValue::Array(fields)) => fields
            .iter()
            .map(|f| -> Result<Field, SchemaError> {
                let title = opt_str(as_object(f, "field")?, "title")?
                    .map(FieldName::new)
                    .transpose()?;
                Ok(Field {
                    title,
                    schema: parse_schema(f)?,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?,
        _ => return Err(malformed("constructor requires a `fields` array")),
    };
    let has_constr = opt_bool(obj, "hasConstr")?.unwrap_or(true);
    Ok(ConstructorSchema::new(title, index, fields)?.with_constr(has_constr))
}

/// Reads one schema node from blueprint JSON
///
/// # Errors
///
/// [`SchemaError::Malformed`] for unknown `dataType`s and ill-typed keywords,
/// and the same naming and duplicate errors the builders raise.
pub fn parse_schema(json: &JsonValue) -> Result<Schema, SchemaError> {
    let obj = as_object(json, "schema")?;
    if let Some(pointer) = opt_str(obj, "$ref")? {
        return Ok(Schema::Ref(ref_name(pointer)?));
    }
    if let Some(any_of) = obj.get("anyOf") {
        let variants = any_of
            .as_array()
            .ok_or_else(|| malformed("`anyOf` must be an array"))?
            .iter()
            .map(parse_constructor)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Schema::Enum(EnumSchema::new(variants)?));
    }
    let data_type = match opt_str(obj, "dataType")? {
        Some(t) => t,
        None => return Ok(Schema::Any),
    };
    match data_type {
        "integer" => Ok(Schema::Integer(IntegerSchema {
            minimum: opt_bigint(obj, "minimum")?,
            maximum: opt_bigint(obj, "maximum")?,
            exclusive_minimum: opt_bigint(obj, "exclusiveMinimum")?,
            exclusive_maximum: opt_bigint(obj, "exclusiveMaximum")?,
        })),
        "bytes" => {
            let literals = match obj.get("enum") {
                None => None,
                Some(JsonValue::Array(xs)) => Some(
                    xs.iter()
                        .map(|x| {
                            x.as_str()
                                .ok_or_else(|| malformed("`enum` entries must be hex strings"))
                                .and_then(|s| {
                                    HexString::from_hex(s)
                                        .map_err(|e| malformed(format!("`enum` entry: {}", e)))
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                Some(_) => return Err(malformed("`enum` must be an array")),
            };
            Ok(Schema::Bytes(BytesSchema {
                min_length: opt_usize(obj, "minLength")?,
                max_length: opt_usize(obj, "maxLength")?,
                literals,
            }))
        }
        "list" => {
            let items = match obj.get("items") {
                Some(JsonValue::Array(xs)) => {
                    Items::Tuple(xs.iter().map(parse_schema).collect::<Result<Vec<_>, _>>()?)
                }
                Some(item) => Items::Array(Box::new(parse_schema(item)?)),
                None => return Err(malformed("list requires `items`")),
            };
            Ok(Schema::List(ListSchema {
                items,
                min_items: opt_usize(obj, "minItems")?,
                max_items: opt_usize(obj, "maxItems")?,
                unique_items: opt_bool(obj, "uniqueItems")?.unwrap_or(false),
                has_constr: opt_bool(obj, "hasConstr")?.unwrap_or(false),
            }))
        }
        "map" => {
            let keys = obj
                .get("keys")
                .ok_or_else(|| malformed("map requires `keys`"))?;
            let values = obj
                .get("values")
                .ok_or_else(|| malformed("map requires `values`"))?;
            Ok(Schema::Map(MapSchema {
                keys: Box::new(parse_schema(keys)?),
                values: Box::new(parse_schema(values)?),
                min_items: opt_usize(obj, "minItems")?,
                max_items: opt_usize(obj, "maxItems")?,
            }))
        }
        "constructor" => Ok(Schema::Constructor(parse_constructor(json)?)),
        other => Err(malformed(format!("unknown dataType `{}`", other))),
    }
}

fn insert_opt<T: Into<JsonValue>>(obj: &mut Object, key: &str, val: Option<T>) {
    if let Some(v) = val {
        obj.insert(key.to_owned(), v.into());
    }
}

fn render_bigint(i: &BigInt) -> JsonValue {
    i64::try_from(i)
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::String(i.to_string()))
}

fn render_constructor(c: &ConstructorSchema) -> JsonValue {
    let mut obj = Object::new();
    obj.insert("dataType".into(), "constructor".into());
    if let Some(t) = c.title() {
        obj.insert("title".into(), t.as_str().into());
    }
    obj.insert("index".into(), c.index().into());
    let fields = c
        .fields()
        .iter()
        .map(|f| {
            let mut rendered = render_schema(&f.schema);
            if let (Some(t), Some(o)) = (&f.title, rendered.as_object_mut()) {
                o.insert("title".into(), t.as_str().into());
            }
            rendered
        })
        .collect::<Vec<_>>();
    obj.insert("fields".into(), fields.into());
    if !c.has_constr() {
        obj.insert("hasConstr".into(), false.into());
    }
    JsonValue::Object(obj)
}

/// Writes one schema node as blueprint JSON
#[must_use]
pub fn render_schema(schema: &Schema) -> JsonValue {
    match schema {
        Schema::Integer(s) => {
            let mut obj = Object::new();
            obj.insert("dataType".into(), "integer".into());
            insert_opt(&mut obj, "minimum", s.minimum.as_ref().map(render_bigint));
            insert_opt(&mut obj, "maximum", s.maximum.as_ref().map(render_bigint));
            insert_opt(&mut obj, "exclusiveMinimum", s.exclusive_minimum.as_ref().map(render_bigint));
            insert_opt(&mut obj, "exclusiveMaximum", s.exclusive_maximum.as_ref().map(render_bigint));
            JsonValue::Object(obj)
        }
        Schema::Bytes(s) => {
            let mut obj = Object::new();
            obj.insert("dataType".into(), "bytes".into());
            insert_opt(&mut obj, "minLength", s.min_length);
            insert_opt(&mut obj, "maxLength", s.max_length);
            insert_opt(
                &mut obj,
                "enum",
                s.literals
                    .as_ref()
                    .map(|xs| xs.iter().map(HexString::to_hex).collect::<Vec<_>>()),
            );
            JsonValue::Object(obj)
        }
        Schema::List(s) => {
            let mut obj = Object::new();
            obj.insert("dataType".into(), "list".into());
            let items = match &s.items {
                Items::Array(item) => render_schema(item),
                Items::Tuple(items) => items.iter().map(render_schema).collect(),
            };
            obj.insert("items".into(), items);
            insert_opt(&mut obj, "minItems", s.min_items);
            insert_opt(&mut obj, "maxItems", s.max_items);
            if s.unique_items {
                obj.insert("uniqueItems".into(), true.into());
            }
            if s.has_constr {
                obj.insert("hasConstr".into(), true.into());
            }
            JsonValue::Object(obj)
        }
        Schema::Map(s) => {
            let mut obj = Object::new();
            obj.insert("dataType".into(), "map".into());
            obj.insert("keys".into(), render_schema(&s.keys));
            obj.insert("values".into(), render_schema(&s.values));
            insert_opt(&mut obj, "minItems", s.min_items);
            insert_opt(&mut obj, "maxItems", s.max_items);
            JsonValue::Object(obj)
        }
        Schema::Constructor(c) => render_constructor(c),
        Schema::Enum(e) => {
            json!({ "anyOf": e.variants().iter().map(render_constructor).collect::<Vec<_>>() })
        }
        Schema::Ref(name) => json!({ "$ref": ref_pointer(name) }),
        Schema::Any => json!({ "description": "Any Data." }),
    }
}

impl Document {
    /// Reads a root schema and its `definitions` table
    ///
    /// The root is either the object itself (with `definitions` alongside its
    /// own keywords) or, when present, the object under `shape`.
    pub fn from_json(json: &JsonValue) -> Result<Self, SchemaError> {
        let obj = as_object(json, "document")?;
        let definitions = match obj.get("definitions") {
            None => Definitions::new(),
            Some(defs) => as_object(defs, "`definitions`")?
                .iter()
                .map(|(name, s)| Ok((name.as_str(), parse_schema(s)?)))
                .collect::<Result<Definitions, SchemaError>>()?,
        };
        let root = match obj.get("shape") {
            Some(shape) => parse_schema(shape)?,
            None => parse_schema(json)?,
        };
        Document::new(root, definitions)
    }

    /// Writes the document back as `{ "shape": .., "definitions": {..} }`
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let definitions = self
            .definitions()
            .iter()
            .map(|(name, s)| (name.to_owned(), render_schema(s)))
            .collect::<Object>();
        json!({ "shape": render_schema(self.root()), "definitions": definitions })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::NamingError;
    use crate::schema::EnumItem;

    #[test]
    fn builders_and_json_agree() {
        let built = Schema::enumeration(vec![
            EnumItem::named("Spend", vec![("amount", Schema::integer())]),
            EnumItem::from("Cancel"),
        ])
        .unwrap();
        let parsed = parse_schema(&json!({
            "anyOf": [
                {
                    "dataType": "constructor",
                    "title": "Spend",
                    "index": 0,
                    "fields": [{ "title": "amount", "dataType": "integer" }]
                },
                { "dataType": "constructor", "title": "Cancel", "index": 1, "fields": [] }
            ]
        }))
        .unwrap();
        assert_eq!(parsed, built);
        assert_eq!(parse_schema(&render_schema(&built)).unwrap(), built);
    }

    #[test]
    fn keywords() {
        let s = parse_schema(&json!({
            "dataType": "list",
            "items": { "dataType": "bytes", "minLength": 28, "maxLength": 28 },
            "minItems": 1,
            "uniqueItems": true
        }))
        .unwrap();
        let Schema::List(ref l) = s else {
            panic!("expected list")
        };
        assert!(l.unique_items);
        assert_eq!(l.min_items, Some(1));
        assert_eq!(parse_schema(&render_schema(&s)).unwrap(), s);

        let big = json!({ "dataType": "integer", "maximum": "100000000000000000000000" });
        let Schema::Integer(i) = parse_schema(&big).unwrap() else {
            panic!("expected integer")
        };
        assert_eq!(i.maximum, Some("100000000000000000000000".parse().unwrap()));

        assert_eq!(parse_schema(&json!({ "description": "Any Data." })).unwrap(), Schema::Any);
        let bool_schema = parse_schema(&render_schema(&Schema::boolean())).unwrap();
        assert_eq!(bool_schema, Schema::boolean());
    }

    #[test]
    fn naming_checked_on_parse() {
        let bad = json!({
            "dataType": "constructor",
            "index": 0,
            "fields": [{ "title": "Amount", "dataType": "integer" }]
        });
        assert_eq!(
            parse_schema(&bad),
            Err(SchemaError::Naming(NamingError::ExpectedLowercase("Amount".into())))
        );
        assert!(matches!(
            parse_schema(&json!({ "dataType": "#string" })),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn documents_and_refs() {
        let doc = Document::from_json(&json!({
            "shape": { "$ref": "#/definitions/aiken~1list" },
            "definitions": {
                "aiken/list": {
                    "dataType": "list",
                    "items": { "$ref": "#/definitions/Int" }
                },
                "Int": { "dataType": "integer" }
            }
        }))
        .unwrap();
        assert_eq!(doc.root(), &Schema::reference("aiken/list"));
        assert_eq!(Document::from_json(&doc.to_json()).unwrap(), doc);

        let dangling = json!({ "$ref": "#/definitions/Missing" });
        assert_eq!(
            Document::from_json(&dangling),
            Err(SchemaError::UnresolvedRef("Missing".into()))
        );
        assert!(parse_schema(&json!({ "$ref": "other.json#/Foo" })).is_err());
    }
}
