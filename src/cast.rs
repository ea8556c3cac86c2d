//! Structural cast engine
//!
//! [`cast_to`] folds a typed [`Value`] into [`Data`] under the direction of a
//! schema, and [`cast_from`] lifts `Data` back into a `Value`. Both are
//! depth-first walks over the schema that fail on the first node whose input
//! does not have the expected shape or breaks a constraint, returning no
//! partial result.
//!
//! `$ref` nodes are resolved against the definitions carried by the
//! [`Shape`]; a bare [`Schema`] has none, so any reference inside it fails
//! with [`CastError::Unresolved`].
//!
//! Typed forms produced and accepted per schema node:
//!
//! | schema | `Value` |
//! |---|---|
//! | integer | [`Value::Int`] |
//! | bytes | [`Value::Bytes`] |
//! | array, tuple | [`Value::List`] |
//! | map | [`Value::Map`] |
//! | constructor without fields | [`Value::Unit`] |
//! | constructor with named fields | [`Value::Record`] |
//! | constructor with anonymous fields | [`Value::List`] |
//! | boolean | [`Value::Bool`] |
//! | nullable | [`Value::Nullable`] |
//! | other enums | [`Value::Variant`] |
//! | any | [`Value::Data`] |
//!
//! An enum with a single variant casts as that constructor (this is how
//! [`Schema::object`] produces records), unless it was built by
//! [`Schema::enumeration`], which keeps the tag. Boolean and nullable variants
//! must have exactly the arity their convention implies.

use log::trace;

use crate::constraint::{check_bytes, check_integer, check_list_len, check_map_len, check_unique};
use crate::data::{Constr, Data};
use crate::error::{CastError, ConstraintError};
use crate::schema::{
    ConstructorSchema, Definitions, EnumKind, EnumSchema, Field, Items, ListSchema, Schema, Shape,
    Tag,
};
use crate::value::{Payload, Record, Value, Variant};

/// Folds `value` into `Data` according to `shape`
///
/// # Errors
///
/// * [`CastError::ShapeMismatch`] when a node of `value` has the wrong form
///   for its schema, including wrong constructor arity and unknown tags.
/// * [`CastError::Constraint`] for range, width, literal, cardinality or
///   uniqueness violations.
/// * [`CastError::Naming`] for a variant tag that does not start uppercase.
/// * [`CastError::Unresolved`] for a `$ref` missing from the definitions.
pub fn cast_to<S: Shape + ?Sized>(value: &Value, shape: &S) -> Result<Data, CastError> {
    Caster::new(shape.definitions()).to(value, shape.root())
}

/// Lifts `data` into a typed `Value` according to `shape`
///
/// Fails under the same conditions as [`cast_to`], with the shape of `data`
/// checked in place of the shape of the typed value.
pub fn cast_from<S: Shape + ?Sized>(data: &Data, shape: &S) -> Result<Value, CastError> {
    Caster::new(shape.definitions()).from(data, shape.root())
}

struct Caster<'a> {
    definitions: Option<&'a Definitions>,
}

impl<'a> Caster<'a> {
    fn new(definitions: Option<&'a Definitions>) -> Self {
        Self { definitions }
    }

    /// Follows `$ref` links until a concrete node is reached
    fn resolve(&self, mut schema: &'a Schema) -> Result<&'a Schema, CastError> {
        let limit = self.definitions.map_or(0, Definitions::len);
        let mut hops = 0;
        while let Schema::Ref(name) = schema {
            trace!("resolving $ref `{}`", name);
            hops += 1;
            schema = self
                .definitions
                .and_then(|defs| defs.get(name))
                .filter(|_| hops <= limit)
                .ok_or_else(|| CastError::Unresolved(name.clone()))?;
        }
        Ok(schema)
    }

    fn to(&self, value: &Value, schema: &'a Schema) -> Result<Data, CastError> {
        let schema = self.resolve(schema)?;
        trace!("cast_to: {} against {}", value.kind(), schema.kind());
        match schema {
            Schema::Integer(s) => match value {
                Value::Int(i) => {
                    check_integer(i, s).map_err(ConstraintError::from)?;
                    Ok(Data::Integer(i.clone()))
                }
                other => Err(CastError::mismatch("integer", other.kind())),
            },
            Schema::Bytes(s) => match value {
                Value::Bytes(b) => {
                    check_bytes(b, s)?;
                    Ok(Data::Bytes(b.clone()))
                }
                other => Err(CastError::mismatch("bytes", other.kind())),
            },
            Schema::List(s) => self.list_to(value, s),
            Schema::Map(s) => match value {
                Value::Map(entries) => {
                    check_map_len(entries.len(), s)?;
                    let entries = entries
                        .iter()
                        .map(|(k, v)| Ok((self.to(k, &s.keys)?, self.to(v, &s.values)?)))
                        .collect::<Result<Vec<_>, CastError>>()?;
                    Ok(Data::Map(entries))
                }
                other => Err(CastError::mismatch("map", other.kind())),
            },
            Schema::Constructor(c) => self.constr_to(value, c),
            Schema::Enum(e) => self.enum_to(value, e),
            Schema::Any => lower(value),
            Schema::Ref(name) => Err(CastError::Unresolved(name.clone())),
        }
    }

    fn list_to(&self, value: &Value, s: &'a ListSchema) -> Result<Data, CastError> {
        let xs = match value {
            Value::List(xs) => xs,
            other => return Err(CastError::mismatch("list", other.kind())),
        };
        match &s.items {
            Items::Array(item) => {
                check_list_len(xs.len(), s)?;
                let out = xs
                    .iter()
                    .map(|x| self.to(x, item))
                    .collect::<Result<Vec<_>, _>>()?;
                if s.unique_items {
                    check_unique(&out)?;
                }
                Ok(Data::List(out))
            }
            Items::Tuple(items) => {
                if xs.len() != items.len() {
                    return Err(CastError::mismatch(
                        format!("tuple of {} elements", items.len()),
                        format!("list of {} elements", xs.len()),
                    ));
                }
                let out = xs
                    .iter()
                    .zip(items)
                    .map(|(x, item)| self.to(x, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if s.has_constr {
                    Data::constr(0, out)
                } else {
                    Data::List(out)
                })
            }
        }
    }

    fn constr_to(&self, value: &Value, c: &'a ConstructorSchema) -> Result<Data, CastError> {
        if c.is_void() {
            return match value {
                Value::Unit => Ok(Data::void()),
                other => Err(CastError::mismatch("unit", other.kind())),
            };
        }
        let fields = match value {
            Value::Unit if c.fields().is_empty() => Vec::new(),
            Value::Record(rec) if c.is_record() => self.named_to(rec, c.fields())?,
            Value::List(xs) if !c.is_record() && !c.fields().is_empty() => {
                self.positional_to(xs, c.fields())?
            }
            other => return Err(CastError::mismatch(describe_fields(c), other.kind())),
        };
        Ok(if c.has_constr() {
            Data::constr(c.index(), fields)
        } else {
            Data::List(fields)
        })
    }

    fn enum_to(&self, value: &Value, e: &'a EnumSchema) -> Result<Data, CastError> {
        match e.kind() {
            EnumKind::Single(c) => match value {
                Value::Variant(v) if c.title().map_or(false, |t| t == v.tag.as_str()) => {
                    self.variant_to(v, e)
                }
                _ => self.constr_to(value, c),
            },
            EnumKind::Boolean => match value {
                Value::Bool(b) => match e.by_index(u64::from(*b)) {
                    Some(v) if v.fields().is_empty() => Ok(Data::constr(v.index(), Vec::new())),
                    Some(v) => Err(CastError::mismatch(
                        "boolean variant without fields",
                        describe_fields(v),
                    )),
                    None => Err(CastError::mismatch("boolean", "missing variant")),
                },
                other => Err(CastError::mismatch("boolean", other.kind())),
            },
            EnumKind::Nullable { some, none } => match (value, some.fields()) {
                (Value::Nullable(None), _) if none.fields().is_empty() => {
                    Ok(Data::constr(1, Vec::new()))
                }
                (Value::Nullable(Some(inner)), [field]) => {
                    Ok(Data::constr(0, vec![self.to(inner, &field.schema)?]))
                }
                (other, _) => Err(CastError::mismatch("nullable", other.kind())),
            },
            EnumKind::Tagged => match value {
                Value::Variant(v) => self.variant_to(v, e),
                other => Err(CastError::mismatch("variant", other.kind())),
            },
        }
    }

    fn variant_to(&self, variant: &Variant, e: &'a EnumSchema) -> Result<Data, CastError> {
        let Variant { tag, payload } = variant;
        Tag::new(tag.as_str())?;
        let v = e
            .by_title(tag)
            .ok_or_else(|| CastError::mismatch("declared variant", format!("tag `{}`", tag)))?;
        let fields = match payload {
            Payload::Unit if v.fields().is_empty() => Vec::new(),
            Payload::Positional(args) if !v.is_record() && !v.fields().is_empty() => {
                self.positional_to(args, v.fields())?
            }
            Payload::Named(rec) if v.is_record() => self.named_to(rec, v.fields())?,
            _ => {
                return Err(CastError::mismatch(
                    describe_fields(v),
                    format!("{} with {} arguments", tag, payload.len()),
                ))
            }
        };
        Ok(Data::constr(v.index(), fields))
    }

    fn positional_to(&self, args: &[Value], fields: &'a [Field]) -> Result<Vec<Data>, CastError> {
        if args.len() != fields.len() {
            return Err(CastError::mismatch(
                format!("{} fields", fields.len()),
                format!("{} fields", args.len()),
            ));
        }
        args.iter()
            .zip(fields)
            .map(|(arg, field)| self.to(arg, &field.schema))
            .collect()
    }

    fn named_to(&self, rec: &Record, fields: &'a [Field]) -> Result<Vec<Data>, CastError> {
        if rec.len() != fields.len() {
            return Err(CastError::mismatch(
                format!("{} fields", fields.len()),
                format!("{} fields", rec.len()),
            ));
        }
        fields
            .iter()
            .map(|field| {
                let title = field.title.as_ref().map_or("", |t| t.as_str());
                let arg = rec
                    .get(title)
                    .ok_or_else(|| CastError::mismatch(format!("field `{}`", title), "nothing"))?;
                self.to(arg, &field.schema)
            })
            .collect()
    }

    fn from(&self, data: &Data, schema: &'a Schema) -> Result<Value, CastError> {
        let schema = self.resolve(schema)?;
        trace!("cast_from: {} against {}", data.kind(), schema.kind());
        match schema {
            Schema::Integer(s) => match data {
                Data::Integer(i) => {
                    check_integer(i, s).map_err(ConstraintError::from)?;
                    Ok(Value::Int(i.clone()))
                }
                other => Err(CastError::mismatch("integer", other.describe())),
            },
            Schema::Bytes(s) => match data {
                Data::Bytes(b) => {
                    check_bytes(b, s)?;
                    Ok(Value::Bytes(b.clone()))
                }
                other => Err(CastError::mismatch("bytes", other.describe())),
            },
            Schema::List(s) => self.list_from(data, s),
            Schema::Map(s) => match data {
                Data::Map(entries) => {
                    check_map_len(entries.len(), s)?;
                    let entries = entries
                        .iter()
                        .map(|(k, v)| Ok((self.from(k, &s.keys)?, self.from(v, &s.values)?)))
                        .collect::<Result<Vec<_>, CastError>>()?;
                    Ok(Value::Map(entries))
                }
                other => Err(CastError::mismatch("map", other.describe())),
            },
            Schema::Constructor(c) => self.constr_from(data, c),
            Schema::Enum(e) => self.enum_from(data, e),
            Schema::Any => Ok(Value::Data(data.clone())),
            Schema::Ref(name) => Err(CastError::Unresolved(name.clone())),
        }
    }

    fn list_from(&self, data: &Data, s: &'a ListSchema) -> Result<Value, CastError> {
        match (&s.items, data) {
            (Items::Array(item), Data::List(xs)) => {
                check_list_len(xs.len(), s)?;
                if s.unique_items {
                    check_unique(xs)?;
                }
                xs.iter()
                    .map(|x| self.from(x, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            (Items::Tuple(items), Data::Constr(Constr { index: 0, fields })) if s.has_constr => {
                self.tuple_from(fields, items)
            }
            (Items::Tuple(items), Data::List(xs)) if !s.has_constr => self.tuple_from(xs, items),
            (Items::Array(_), other) => Err(CastError::mismatch("array", other.describe())),
            (Items::Tuple(_), other) if s.has_constr => {
                Err(CastError::mismatch("tuple in constructor 0", other.describe()))
            }
            (Items::Tuple(_), other) => Err(CastError::mismatch("tuple", other.describe())),
        }
    }

    fn tuple_from(&self, xs: &[Data], items: &'a [Schema]) -> Result<Value, CastError> {
        if xs.len() != items.len() {
            return Err(CastError::mismatch(
                format!("tuple of {} elements", items.len()),
                format!("{} elements", xs.len()),
            ));
        }
        xs.iter()
            .zip(items)
            .map(|(x, item)| self.from(x, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    fn constr_from(&self, data: &Data, c: &'a ConstructorSchema) -> Result<Value, CastError> {
        if c.is_void() {
            return match data {
                Data::Constr(k) if k.is_void() => Ok(Value::Unit),
                other => Err(CastError::mismatch("void", other.describe())),
            };
        }
        match data {
            Data::Constr(k) if c.has_constr() && k.index == c.index() => {
                self.fields_from(&k.fields, c)
            }
            Data::List(xs) if !c.has_constr() => self.fields_from(xs, c),
            other => Err(CastError::mismatch(describe_fields(c), other.describe())),
        }
    }

    fn fields_from(&self, xs: &[Data], c: &'a ConstructorSchema) -> Result<Value, CastError> {
        let fields = c.fields();
        if xs.len() != fields.len() {
            return Err(CastError::mismatch(
                describe_fields(c),
                format!("{} fields", xs.len()),
            ));
        }
        if fields.is_empty() {
            return Ok(Value::Unit);
        }
        if c.is_record() {
            xs.iter()
                .zip(fields)
                .map(|(x, field)| {
                    let title = field.title.as_ref().map_or_else(String::new, |t| t.to_string());
                    Ok((title, self.from(x, &field.schema)?))
                })
                .collect::<Result<Record, CastError>>()
                .map(Value::Record)
        } else {
            xs.iter()
                .zip(fields)
                .map(|(x, field)| self.from(x, &field.schema))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
    }

    fn enum_from(&self, data: &Data, e: &'a EnumSchema) -> Result<Value, CastError> {
        if let EnumKind::Single(c) = e.kind() {
            return self.constr_from(data, c);
        }
        let k = match data {
            Data::Constr(k) => k,
            other => return Err(CastError::mismatch("enum", other.describe())),
        };
        let v = e
            .by_index(k.index)
            .filter(|v| v.fields().len() == k.fields.len())
            .ok_or_else(|| CastError::mismatch("declared variant", data.describe()))?;
        match e.kind() {
            EnumKind::Boolean if k.fields.is_empty() => Ok(Value::Bool(k.index == 1)),
            EnumKind::Boolean => Err(CastError::mismatch(
                "boolean constructor without fields",
                data.describe(),
            )),
            EnumKind::Nullable { some, .. } => match (k.index, k.fields.as_slice(), some.fields()) {
                (0, [x], [field]) => Ok(Value::some(self.from(x, &field.schema)?)),
                (1, [], _) => Ok(Value::none()),
                _ => Err(CastError::mismatch("nullable", data.describe())),
            },
            EnumKind::Single(_) | EnumKind::Tagged => {
                let tag = v
                    .title()
                    .ok_or_else(|| CastError::mismatch("titled variant", data.describe()))?
                    .to_string();
                let payload = if v.fields().is_empty() {
                    Payload::Unit
                } else {
                    match self.fields_from(&k.fields, v)? {
                        Value::Record(rec) => Payload::Named(rec),
                        Value::List(args) => Payload::Positional(args),
                        other => {
                            return Err(CastError::mismatch(describe_fields(v), other.kind()))
                        }
                    }
                };
                Ok(Value::Variant(Variant { tag, payload }))
            }
        }
    }
}

/// Lowers a value that carries no schema-dependent structure into `Data`
fn lower(value: &Value) -> Result<Data, CastError> {
    match value {
        Value::Data(d) => Ok(d.clone()),
        Value::Int(i) => Ok(Data::Integer(i.clone())),
        Value::Bytes(b) => Ok(Data::Bytes(b.clone())),
        Value::List(xs) => xs
            .iter()
            .map(lower)
            .collect::<Result<Vec<_>, _>>()
            .map(Data::List),
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| Ok((lower(k)?, lower(v)?)))
            .collect::<Result<Vec<_>, CastError>>()
            .map(Data::Map),
        other => Err(CastError::mismatch("data", other.kind())),
    }
}

fn describe_fields(c: &ConstructorSchema) -> String {
    let what = if c.is_record() { "named" } else { "positional" };
    match c.title() {
        Some(t) => format!("{} with {} {} fields", t, c.fields().len(), what),
        None => format!("constructor {} with {} {} fields", c.index(), c.fields().len(), what),
    }
}
