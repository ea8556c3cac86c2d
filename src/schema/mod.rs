//! Schema description language
//!
//! A [`Schema`] describes the expected shape of a typed [`Value`](crate::Value)
//! and how it folds into [`Data`](crate::Data). It is a closed sum type with
//! one case per node kind, so every consumer matches it exhaustively:
//!
//! | node | `Data` form |
//! |---|---|
//! | [`Schema::Integer`] | integer, range-checked |
//! | [`Schema::Bytes`] | byte string, width/literal-checked |
//! | [`Schema::List`] with [`Items::Array`] | homogeneous list |
//! | [`Schema::List`] with [`Items::Tuple`] | list, or constructor 0 when `has_constr` |
//! | [`Schema::Map`] | map |
//! | [`Schema::Constructor`] | constructor (or bare list when `has_constr` is off) |
//! | [`Schema::Enum`] | constructor chosen among variants; also booleans and nullables |
//! | [`Schema::Ref`] | resolved through [`Definitions`] |
//! | [`Schema::Any`] | anything, unchecked |
//!
//! Schemas are immutable once built and may be shared freely between threads.
//! Recursive types are expressed with [`Schema::Ref`] nodes inside a
//! [`Document`], which pairs a root schema with its definitions table.
//!
//! The combinators that build schemas live in [`builder`]; naming checks live
//! in [`names`].

pub mod builder;
pub mod names;

use std::collections::HashSet;

use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::error::SchemaError;
use crate::hexstring::HexString;

pub use builder::{EnumItem, ListOptions, MapOptions, ObjectOptions, TupleOptions};
pub use names::{FieldName, Tag};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Schema {
    Integer(IntegerSchema),
    Bytes(BytesSchema),
    List(ListSchema),
    Map(MapSchema),
    Constructor(ConstructorSchema),
    Enum(EnumSchema),
    /// Name of an entry in the enclosing [`Definitions`]
    Ref(String),
    Any,
}

impl Schema {
    /// Name of the node kind, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Schema::Integer(_) => "integer",
            Schema::Bytes(_) => "bytes",
            Schema::List(ListSchema {
                items: Items::Array(_),
                ..
            }) => "array",
            Schema::List(_) => "tuple",
            Schema::Map(_) => "map",
            Schema::Constructor(_) => "constructor",
            Schema::Enum(_) => "enum",
            Schema::Ref(_) => "$ref",
            Schema::Any => "any",
        }
    }

    /// Visits every `$ref` name reachable from this node without following them
    fn collect_refs<'a>(&'a self, acc: &mut Vec<&'a str>) {
        match self {
            Schema::Integer(_) | Schema::Bytes(_) | Schema::Any => {}
            Schema::Ref(name) => acc.push(name),
            Schema::List(list) => match &list.items {
                Items::Array(item) => item.collect_refs(acc),
                Items::Tuple(items) => items.iter().for_each(|s| s.collect_refs(acc)),
            },
            Schema::Map(map) => {
                map.keys.collect_refs(acc);
                map.values.collect_refs(acc);
            }
            Schema::Constructor(c) => c.fields().iter().for_each(|f| f.schema.collect_refs(acc)),
            Schema::Enum(e) => e
                .variants()
                .iter()
                .flat_map(ConstructorSchema::fields)
                .for_each(|f| f.schema.collect_refs(acc)),
        }
    }
}

/// Integer leaf with optional inclusive and exclusive bounds
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct IntegerSchema {
    pub minimum: Option<BigInt>,
    pub maximum: Option<BigInt>,
    pub exclusive_minimum: Option<BigInt>,
    pub exclusive_maximum: Option<BigInt>,
}

impl IntegerSchema {
    #[must_use]
    pub fn minimum(mut self, min: impl Into<BigInt>) -> Self {
        self.minimum = Some(min.into());
        self
    }

    #[must_use]
    pub fn maximum(mut self, max: impl Into<BigInt>) -> Self {
        self.maximum = Some(max.into());
        self
    }

    #[must_use]
    pub fn exclusive_minimum(mut self, min: impl Into<BigInt>) -> Self {
        self.exclusive_minimum = Some(min.into());
        self
    }

    #[must_use]
    pub fn exclusive_maximum(mut self, max: impl Into<BigInt>) -> Self {
        self.exclusive_maximum = Some(max.into());
        self
    }
}

/// Byte-string leaf with optional width window and permitted literals
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BytesSchema {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub literals: Option<Vec<HexString>>,
}

impl BytesSchema {
    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Restricts values to a fixed set of byte strings
    #[must_use]
    pub fn literals(mut self, set: Vec<HexString>) -> Self {
        self.literals = Some(set);
        self
    }
}

/// Numeric shorthand: exactly `n` bytes
impl From<usize> for BytesSchema {
    fn from(n: usize) -> Self {
        Self {
            min_length: Some(n),
            max_length: Some(n),
            literals: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Items {
    /// Every element shares one schema
    Array(Box<Schema>),
    /// Element `i` follows schema `i`
    Tuple(Vec<Schema>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ListSchema {
    pub items: Items,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    /// Tuples only: wrap the elements in constructor 0 rather than a bare list
    pub has_constr: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MapSchema {
    pub keys: Box<Schema>,
    pub values: Box<Schema>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Constructor field, named in records and anonymous in positional constructors
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    pub title: Option<FieldName>,
    pub schema: Schema,
}

impl Field {
    #[must_use]
    pub fn positional(schema: Schema) -> Self {
        Self {
            title: None,
            schema,
        }
    }

    pub fn named(title: &str, schema: Schema) -> Result<Self, SchemaError> {
        Ok(Self {
            title: Some(FieldName::new(title)?),
            schema,
        })
    }
}

/// Constructor node
///
/// Its fields are either all titled (a record) or all untitled (positional);
/// [`ConstructorSchema::new`] rejects a mix, and rejects duplicate titles.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConstructorSchema {
    title: Option<Tag>,
    index: u64,
    fields: Vec<Field>,
    has_constr: bool,
}

impl ConstructorSchema {
    pub fn new(title: Option<Tag>, index: u64, fields: Vec<Field>) -> Result<Self, SchemaError> {
        let titled = fields.iter().filter(|f| f.title.is_some()).count();
        if titled != 0 && titled != fields.len() {
            return Err(SchemaError::MixedFieldTitles {
                constructor: title.map(|t| t.to_string()),
            });
        }
        let mut seen = HashSet::new();
        for name in fields.iter().filter_map(|f| f.title.as_ref()) {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateTitle(name.to_string()));
            }
        }
        Ok(Self {
            title,
            index,
            fields,
            has_constr: true,
        })
    }

    /// Sets whether the fields are wrapped in a constructor (the default) or
    /// emitted as a bare list
    #[must_use]
    pub fn with_constr(mut self, has_constr: bool) -> Self {
        self.has_constr = has_constr;
        self
    }

    #[must_use]
    pub fn title(&self) -> Option<&Tag> {
        self.title.as_ref()
    }

    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn has_constr(&self) -> bool {
        self.has_constr
    }

    /// Whether fields carry names
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.fields.first().map_or(false, |f| f.title.is_some())
    }

    /// The empty constructor at index 0, whose typed form is [`Value::Unit`](crate::Value::Unit)
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.index == 0 && self.fields.is_empty()
    }
}

/// Sum of constructor variants
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumSchema {
    variants: Vec<ConstructorSchema>,
    keep_tag: bool,
}

/// How an [`EnumSchema`] is cast, decided by its variant titles
#[derive(Clone, Copy, Debug)]
pub enum EnumKind<'a> {
    /// One variant without a kept tag: cast exactly as that constructor
    Single(&'a ConstructorSchema),
    /// `False` at index 0 and `True` at index 1
    Boolean,
    /// `Some` at index 0 and `None` at index 1
    Nullable {
        some: &'a ConstructorSchema,
        none: &'a ConstructorSchema,
    },
    Tagged,
}

impl EnumSchema {
    /// Checks that the variant list is non-empty, that indices and titles are
    /// unique, and that every variant is titled when there is more than one.
    pub fn new(variants: Vec<ConstructorSchema>) -> Result<Self, SchemaError> {
        if variants.is_empty() {
            return Err(SchemaError::Malformed("enum without variants".into()));
        }
        let mut indices = HashSet::new();
        let mut titles = HashSet::new();
        for v in &variants {
            if !indices.insert(v.index) {
                return Err(SchemaError::DuplicateIndex(v.index));
            }
            match v.title() {
                Some(t) if !titles.insert(t.as_str()) => {
                    return Err(SchemaError::DuplicateTitle(t.to_string()))
                }
                None if variants.len() > 1 => {
                    return Err(SchemaError::Malformed(format!(
                        "untitled variant at index {} in multi-variant enum",
                        v.index
                    )))
                }
                _ => {}
            }
        }
        Ok(Self {
            variants,
            keep_tag: false,
        })
    }

    /// Casts a lone variant as a tagged [`Variant`](crate::Variant) instead of
    /// its bare constructor. No effect on enums with several variants.
    #[must_use]
    pub fn keep_tag(mut self) -> Self {
        self.keep_tag = self.variants.len() == 1;
        self
    }

    #[must_use]
    pub fn variants(&self) -> &[ConstructorSchema] {
        &self.variants
    }

    #[must_use]
    pub fn kind(&self) -> EnumKind<'_> {
        let titled = |ix: usize, name: &str| {
            self.variants
                .get(ix)
                .map_or(false, |v| v.index == ix as u64 && v.title().map_or(false, |t| t == name))
        };
        match self.variants.as_slice() {
            [only] if !self.keep_tag => EnumKind::Single(only),
            [_, _] if titled(0, "False") && titled(1, "True") => EnumKind::Boolean,
            [some, none] if titled(0, "Some") && titled(1, "None") => {
                EnumKind::Nullable { some, none }
            }
            _ => EnumKind::Tagged,
        }
    }

    #[must_use]
    pub fn by_index(&self, index: u64) -> Option<&ConstructorSchema> {
        self.variants.iter().find(|v| v.index == index)
    }

    #[must_use]
    pub fn by_title(&self, title: &str) -> Option<&ConstructorSchema> {
        self.variants
            .iter()
            .find(|v| v.title().map_or(false, |t| t == title))
    }
}

/// Named schemas that `$ref` nodes resolve against
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Definitions(IndexMap<String, Schema>);

impl Definitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) -> Option<Schema> {
        self.0.insert(name.into(), schema)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Schema)> for Definitions {
    fn from_iter<T: IntoIterator<Item = (S, Schema)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A root schema together with the definitions its `$ref` nodes point into
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Document {
    root: Schema,
    definitions: Definitions,
}

impl Document {
    /// Pairs `root` with `definitions`, failing if any `$ref` reachable from
    /// the root or from a definition is missing from the table.
    pub fn new(root: Schema, definitions: Definitions) -> Result<Self, SchemaError> {
        let mut refs = Vec::new();
        root.collect_refs(&mut refs);
        for (_, schema) in definitions.iter() {
            schema.collect_refs(&mut refs);
        }
        if let Some(missing) = refs.into_iter().find(|r| definitions.get(r).is_none()) {
            return Err(SchemaError::UnresolvedRef(missing.to_owned()));
        }
        Ok(Self { root, definitions })
    }

    #[must_use]
    pub fn root(&self) -> &Schema {
        &self.root
    }

    #[must_use]
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

/// Anything the cast engine can be driven by: a bare [`Schema`], or a
/// [`Document`] that also carries definitions.
pub trait Shape {
    fn root(&self) -> &Schema;

    fn definitions(&self) -> Option<&Definitions>;
}

impl Shape for Schema {
    fn root(&self) -> &Schema {
        self
    }

    fn definitions(&self) -> Option<&Definitions> {
        None
    }
}

impl Shape for Document {
    fn root(&self) -> &Schema {
        &self.root
    }

    fn definitions(&self) -> Option<&Definitions> {
        Some(&self.definitions)
    }
}

impl<S: Shape + ?Sized> Shape for &S {
    fn root(&self) -> &Schema {
        (**self).root()
    }

    fn definitions(&self) -> Option<&Definitions> {
        (**self).definitions()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn variant(title: &str, index: u64) -> ConstructorSchema {
        ConstructorSchema::new(Some(Tag::new(title).unwrap()), index, vec![]).unwrap()
    }

    #[test]
    fn boolean_and_nullable_are_detected() {
        assert!(matches!(Schema::boolean(), Schema::Enum(ref e) if matches!(e.kind(), EnumKind::Boolean)));
        match Schema::nullable(Schema::integer()) {
            Schema::Enum(e) => assert!(matches!(e.kind(), EnumKind::Nullable { .. })),
            _ => panic!("nullable is an enum"),
        }
        let swapped = EnumSchema::new(vec![variant("True", 0), variant("False", 1)]).unwrap();
        assert!(matches!(swapped.kind(), EnumKind::Tagged));
    }

    #[test]
    fn enum_rejects_duplicates() {
        assert_eq!(
            EnumSchema::new(vec![variant("A", 0), variant("B", 0)]),
            Err(SchemaError::DuplicateIndex(0))
        );
        assert_eq!(
            EnumSchema::new(vec![variant("A", 0), variant("A", 1)]),
            Err(SchemaError::DuplicateTitle("A".into()))
        );
        assert!(EnumSchema::new(vec![]).is_err());
    }

    #[test]
    fn constructor_rejects_mixed_titles() {
        let fields = vec![
            Field::named("amount", Schema::integer()).unwrap(),
            Field::positional(Schema::integer()),
        ];
        assert!(matches!(
            ConstructorSchema::new(None, 0, fields),
            Err(SchemaError::MixedFieldTitles { .. })
        ));
    }

    #[test]
    fn document_checks_refs() {
        let list = Schema::array(Schema::reference("Tree"));
        let defs: Definitions = [("Tree", list.clone())].into_iter().collect();
        assert!(Document::new(Schema::reference("Tree"), defs).is_ok());
        assert_eq!(
            Document::new(list, Definitions::new()),
            Err(SchemaError::UnresolvedRef("Tree".into()))
        );
    }
}
