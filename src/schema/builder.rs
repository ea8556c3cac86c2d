//! Schema combinators
//!
//! Every builder is an associated function on [`Schema`]. Leaf and container
//! builders cannot fail; [`Schema::object`] and [`Schema::enumeration`] take
//! caller-supplied names and so check the casing convention eagerly, before
//! any value is ever cast.
//!
//! ```
//! use pdata::schema::{EnumItem, Schema};
//!
//! let action = Schema::enumeration(vec![
//!     EnumItem::from("Cancel"),
//!     EnumItem::named("Spend", vec![("amount", Schema::integer())]),
//! ])
//! .unwrap();
//! assert!(Schema::enumeration(vec![EnumItem::from("cancel")]).is_err());
//! # let _ = action;
//! ```

use crate::error::SchemaError;

use super::names::Tag;
use super::{
    BytesSchema, ConstructorSchema, EnumSchema, Field, IntegerSchema, Items, ListSchema,
    MapSchema, Schema,
};

/// Cardinality and uniqueness options for [`Schema::array_with`]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ListOptions {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

/// Numeric shorthand: exactly `n` elements
impl From<usize> for ListOptions {
    fn from(n: usize) -> Self {
        Self {
            min_items: Some(n),
            max_items: Some(n),
            unique_items: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MapOptions {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Numeric shorthand: exactly `n` entries
impl From<usize> for MapOptions {
    fn from(n: usize) -> Self {
        Self {
            min_items: Some(n),
            max_items: Some(n),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ObjectOptions {
    /// Wrap fields in constructor 0 (default) rather than a bare list
    pub has_constr: bool,
}

impl Default for ObjectOptions {
    fn default() -> Self {
        Self { has_constr: true }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TupleOptions {
    /// Wrap elements in constructor 0 rather than a bare list (the default)
    pub has_constr: bool,
}

/// One declared variant of [`Schema::enumeration`]
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EnumItem {
    /// Variant without arguments
    Tag(String),
    /// Variant whose arguments are identified by position
    Positional(String, Vec<Schema>),
    /// Variant whose arguments are identified by field name
    Named(String, Vec<(String, Schema)>),
}

impl EnumItem {
    #[must_use]
    pub fn positional(tag: &str, args: Vec<Schema>) -> Self {
        EnumItem::Positional(tag.to_owned(), args)
    }

    #[must_use]
    pub fn named(tag: &str, args: Vec<(&str, Schema)>) -> Self {
        EnumItem::Named(
            tag.to_owned(),
            args.into_iter().map(|(k, s)| (k.to_owned(), s)).collect(),
        )
    }

    fn into_variant(self, index: u64) -> Result<ConstructorSchema, SchemaError> {
        let (tag, fields) = match self {
            EnumItem::Tag(tag) => (tag, Vec::new()),
            EnumItem::Positional(tag, args) => {
                (tag, args.into_iter().map(Field::positional).collect())
            }
            EnumItem::Named(tag, args) => (
                tag,
                args.into_iter()
                    .map(|(name, schema)| Field::named(&name, schema))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        ConstructorSchema::new(Some(Tag::new(tag)?), index, fields)
    }
}

impl From<&str> for EnumItem {
    fn from(tag: &str) -> Self {
        EnumItem::Tag(tag.to_owned())
    }
}

impl Schema {
    #[must_use]
    pub fn bytes() -> Self {
        Schema::Bytes(BytesSchema::default())
    }

    /// Byte string with width or literal restrictions; a bare `usize` fixes the width
    #[must_use]
    pub fn bytes_with(opts: impl Into<BytesSchema>) -> Self {
        Schema::Bytes(opts.into())
    }

    #[must_use]
    pub fn integer() -> Self {
        Schema::Integer(IntegerSchema::default())
    }

    #[must_use]
    pub fn integer_with(bounds: IntegerSchema) -> Self {
        Schema::Integer(bounds)
    }

    /// `False` at index 0, `True` at index 1
    #[must_use]
    pub fn boolean() -> Self {
        Schema::Enum(EnumSchema {
            variants: vec![
                Self::bare_variant("False", 0),
                Self::bare_variant("True", 1),
            ],
            keep_tag: false,
        })
    }

    #[must_use]
    pub fn any() -> Self {
        Schema::Any
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::array_with(items, ListOptions::default())
    }

    #[must_use]
    pub fn array_with(items: Schema, opts: impl Into<ListOptions>) -> Self {
        let opts = opts.into();
        Schema::List(ListSchema {
            items: Items::Array(Box::new(items)),
            min_items: opts.min_items,
            max_items: opts.max_items,
            unique_items: opts.unique_items,
            has_constr: false,
        })
    }

    #[must_use]
    pub fn map(keys: Schema, values: Schema) -> Self {
        Self::map_with(keys, values, MapOptions::default())
    }

    #[must_use]
    pub fn map_with(keys: Schema, values: Schema, opts: impl Into<MapOptions>) -> Self {
        let opts = opts.into();
        Schema::Map(MapSchema {
            keys: Box::new(keys),
            values: Box::new(values),
            min_items: opts.min_items,
            max_items: opts.max_items,
        })
    }

    /// Record with named fields, as a single-variant enum over constructor 0
    ///
    /// Fails if any field name does not start with a lowercase letter or `_`,
    /// or if a name is repeated.
    pub fn object(fields: Vec<(&str, Schema)>) -> Result<Self, SchemaError> {
        Self::object_with(fields, ObjectOptions::default())
    }

    pub fn object_with(
        fields: Vec<(&str, Schema)>,
        opts: ObjectOptions,
    ) -> Result<Self, SchemaError> {
        let fields = fields
            .into_iter()
            .map(|(name, schema)| Field::named(name, schema))
            .collect::<Result<Vec<_>, _>>()?;
        let constr = ConstructorSchema::new(None, 0, fields)?.with_constr(opts.has_constr);
        Ok(Schema::Enum(EnumSchema {
            variants: vec![constr],
            keep_tag: false,
        }))
    }

    /// Sum type whose variants are indexed in declaration order
    ///
    /// A lone variant still casts to and from a tagged [`Value::Variant`](crate::Value::Variant),
    /// unlike [`Schema::object`].
    ///
    /// Fails if a tag does not start with an uppercase letter, if a named
    /// argument does not start lowercase, or if a tag is repeated.
    pub fn enumeration(items: Vec<EnumItem>) -> Result<Self, SchemaError> {
        let variants = items
            .into_iter()
            .zip(0u64..)
            .map(|(item, ix)| item.into_variant(ix))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::Enum(EnumSchema::new(variants)?.keep_tag()))
    }

    #[must_use]
    pub fn tuple(items: Vec<Schema>) -> Self {
        Self::tuple_with(items, TupleOptions::default())
    }

    #[must_use]
    pub fn tuple_with(items: Vec<Schema>, opts: TupleOptions) -> Self {
        Schema::List(ListSchema {
            items: Items::Tuple(items),
            min_items: None,
            max_items: None,
            unique_items: false,
            has_constr: opts.has_constr,
        })
    }

    /// `Some` (index 0, one field) or `None` (index 1)
    #[must_use]
    pub fn nullable(item: Schema) -> Self {
        let some = ConstructorSchema {
            title: Some(Tag(String::from("Some"))),
            index: 0,
            fields: vec![Field::positional(item)],
            has_constr: true,
        };
        Schema::Enum(EnumSchema {
            variants: vec![some, Self::bare_variant("None", 1)],
            keep_tag: false,
        })
    }

    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Schema::Ref(name.into())
    }

    /// The empty constructor at index 0
    #[must_use]
    pub fn void() -> Self {
        Schema::Constructor(ConstructorSchema {
            title: None,
            index: 0,
            fields: Vec::new(),
            has_constr: true,
        })
    }

    fn bare_variant(title: &str, index: u64) -> ConstructorSchema {
        ConstructorSchema {
            title: Some(Tag(title.to_owned())),
            index,
            fields: Vec::new(),
            has_constr: true,
        }
    }
}
