use pdata::blueprint::parse_schema;
use pdata::error::{CastError, ConstraintError, NamingError, SchemaError, WidthError};
use pdata::schema::{IntegerSchema, ListOptions, MapOptions, TupleOptions};
use pdata::{
    cast_from, cast_to, from, from_data, from_metadata, to, to_data, to_metadata, void, Data,
    Document, EnumItem, Error, HexString, Schema, Value,
};
use serde_json::json;

fn bytes(hex: &str) -> Value {
    Value::bytes(hex).unwrap()
}

fn datum_schema() -> Schema {
    Schema::object(vec![
        ("owner", Schema::bytes_with(4usize)),
        ("deadline", Schema::integer_with(IntegerSchema::default().minimum(0))),
        ("beneficiaries", Schema::map(Schema::bytes(), Schema::integer())),
        ("locked", Schema::boolean()),
        ("note", Schema::nullable(Schema::bytes())),
        (
            "range",
            Schema::tuple_with(
                vec![Schema::integer(), Schema::integer()],
                TupleOptions { has_constr: true },
            ),
        ),
    ])
    .unwrap()
}

fn datum() -> Value {
    Value::record([
        ("owner", bytes("deadbeef")),
        ("deadline", Value::int(1_700_000_000_000i64)),
        (
            "beneficiaries",
            Value::Map(vec![(bytes("01"), Value::int(10)), (bytes("02"), Value::int(20))]),
        ),
        ("locked", Value::Bool(true)),
        ("note", Value::none()),
        ("range", Value::List(vec![Value::int(-5), Value::int(5)])),
    ])
}

#[test]
fn canonical_roundtrip() {
    let schema = datum_schema();
    let hex = to(&datum(), &schema).unwrap();
    assert_eq!(from(&hex.to_hex(), &schema).unwrap(), datum());

    let data = cast_to(&datum(), &schema).unwrap();
    assert_eq!(to_data(&data), hex);
    assert_eq!(from_data(&hex.to_hex()).unwrap(), data);
    assert_eq!(cast_from(&data, &schema).unwrap(), datum());
}

#[test]
fn void_idempotence() {
    assert_eq!(void(), "d87980");
    assert_eq!(to(&Value::Unit, &Schema::void()).unwrap(), void());
    assert_eq!(from(&void().to_hex(), &Schema::void()).unwrap(), Value::Unit);
    assert_eq!(from_data("d87980").unwrap(), Data::void());
}

#[test]
fn boundaries() {
    let int = Schema::integer_with(IntegerSchema::default().minimum(0).maximum(10));
    for ok in [0, 10] {
        assert!(cast_to(&Value::int(ok), &int).is_ok());
    }
    for bad in [-1, 11] {
        assert!(matches!(
            cast_to(&Value::int(bad), &int),
            Err(CastError::Constraint(ConstraintError::Bounds(_)))
        ));
    }

    let two = Schema::bytes_with(2usize);
    assert!(cast_to(&bytes("abcd"), &two).is_ok());
    assert!(cast_to(&bytes("ab"), &two).is_err());
    assert!(cast_to(&bytes("abcdef"), &two).is_err());

    let pairs = Schema::map_with(Schema::integer(), Schema::integer(), MapOptions::from(1usize));
    assert!(cast_to(&Value::Map(vec![]), &pairs).is_err());
    assert!(cast_to(&Value::Map(vec![(Value::int(1), Value::int(2))]), &pairs).is_ok());
}

#[test]
fn naming_convention_is_eager() {
    assert_eq!(
        Schema::object(vec![("Foo", Schema::integer())]),
        Err(SchemaError::Naming(NamingError::ExpectedLowercase("Foo".into())))
    );
    assert_eq!(
        Schema::enumeration(vec![EnumItem::from("lowercase")]),
        Err(SchemaError::Naming(NamingError::ExpectedUppercase("lowercase".into())))
    );
}

#[test]
fn scenarios() {
    let b = Schema::boolean();
    assert_eq!(cast_to(&Value::Bool(true), &b).unwrap(), Data::constr(1, vec![]));
    assert_eq!(cast_to(&Value::Bool(false), &b).unwrap(), Data::constr(0, vec![]));
    assert_eq!(cast_from(&Data::constr(1, vec![]), &b).unwrap(), Value::Bool(true));

    let n = Schema::nullable(Schema::integer());
    assert_eq!(cast_to(&Value::none(), &n).unwrap(), Data::constr(1, vec![]));
    assert_eq!(
        cast_to(&Value::some(Value::int(5)), &n).unwrap(),
        Data::constr(0, vec![Data::int(5)])
    );

    let unique = Schema::array_with(
        Schema::bytes(),
        ListOptions {
            unique_items: true,
            ..ListOptions::default()
        },
    );
    let list = |xs: &[&str]| Value::List(xs.iter().map(|x| bytes(x)).collect());
    assert!(matches!(
        cast_to(&list(&["aa", "bb", "aa"]), &unique),
        Err(CastError::Constraint(ConstraintError::Duplicate { .. }))
    ));
    assert!(cast_to(&list(&["aa", "bb"]), &unique).is_ok());
}

#[test]
fn tagged_enum_with_named_args() {
    let s = Schema::enumeration(vec![EnumItem::named(
        "Spend",
        vec![("amount", Schema::integer())],
    )])
    .unwrap();
    let spend = Value::named("Spend", [("amount", Value::int(5))]);
    let data = cast_to(&spend, &s).unwrap();
    assert_eq!(data, Data::constr(0, vec![Data::int(5)]));
    assert_eq!(cast_from(&data, &s).unwrap(), spend);
    assert_eq!(from(&to(&spend, &s).unwrap().to_hex(), &s).unwrap(), spend);
}

#[test]
fn lone_blueprint_constructor_is_a_record() {
    let s = parse_schema(&json!({ "anyOf": [{
        "title": "Datum",
        "dataType": "constructor",
        "index": 0,
        "fields": [{ "title": "owner", "dataType": "bytes" }]
    }]}))
    .unwrap();
    let record = Value::record([("owner", bytes("ab"))]);
    let data = cast_to(&record, &s).unwrap();
    assert_eq!(cast_from(&data, &s).unwrap(), record);
    assert_eq!(cast_to(&Value::named("Datum", [("owner", bytes("ab"))]), &s).unwrap(), data);
}

#[test]
fn blueprint_boolean_and_nullable_are_strict() {
    let boolean = parse_schema(&json!({ "anyOf": [
        { "title": "False", "dataType": "constructor", "index": 0,
          "fields": [{ "dataType": "integer" }] },
        { "title": "True", "dataType": "constructor", "index": 1, "fields": [] }
    ]}))
    .unwrap();
    assert!(matches!(
        cast_from(&Data::constr(0, vec![Data::int(7)]), &boolean),
        Err(CastError::ShapeMismatch { .. })
    ));
    assert!(cast_to(&Value::Bool(false), &boolean).is_err());
    assert_eq!(cast_from(&Data::constr(1, vec![]), &boolean).unwrap(), Value::Bool(true));

    let nullable = parse_schema(&json!({ "anyOf": [
        { "title": "Some", "dataType": "constructor", "index": 0,
          "fields": [{ "dataType": "integer" }] },
        { "title": "None", "dataType": "constructor", "index": 1,
          "fields": [{ "dataType": "integer" }] }
    ]}))
    .unwrap();
    assert!(cast_from(&Data::constr(1, vec![Data::int(0)]), &nullable).is_err());
    assert!(cast_to(&Value::none(), &nullable).is_err());
    assert_eq!(
        cast_from(&Data::constr(0, vec![Data::int(3)]), &nullable).unwrap(),
        Value::some(Value::int(3))
    );
}

#[test]
fn decoded_bytes_are_width_checked() {
    let two = Schema::bytes_with(2usize);
    assert!(matches!(
        from("41ab", &two),
        Err(Error::Cast(CastError::Constraint(ConstraintError::Width(
            WidthError::TooNarrow { .. }
        ))))
    ));
    assert_eq!(from("42abcd", &two).unwrap(), bytes("abcd"));
    assert!(from("43abcdef", &two).is_err());
}

#[test]
fn blueprint_document() {
    let doc = Document::from_json(&json!({
        "shape": { "$ref": "#/definitions/Redeemer" },
        "definitions": {
            "Redeemer": {
                "anyOf": [
                    {
                        "title": "Claim",
                        "dataType": "constructor",
                        "index": 0,
                        "fields": [{ "title": "proof", "$ref": "#/definitions/Bytes32" }]
                    },
                    { "title": "Refund", "dataType": "constructor", "index": 1, "fields": [] }
                ]
            },
            "Bytes32": { "dataType": "bytes", "minLength": 32, "maxLength": 32 }
        }
    }))
    .unwrap();

    let claim = Value::named("Claim", [("proof", Value::Bytes(HexString::from_vec(vec![7; 32])))]);
    let hex = to(&claim, &doc).unwrap();
    assert_eq!(from(&hex.to_hex(), &doc).unwrap(), claim);
    assert_eq!(to(&Value::tag("Refund"), &doc).unwrap(), "d87a80");

    let short = Value::named("Claim", [("proof", bytes("07"))]);
    assert!(matches!(to(&short, &doc), Err(Error::Cast(CastError::Constraint(_)))));

    assert!(parse_schema(&json!({ "anyOf": [
        { "title": "claim", "dataType": "constructor", "index": 0, "fields": [] }
    ]}))
    .is_err());
}

#[test]
fn metadata_convention() {
    let meta = json!({
        "name": "Plutus",
        "image": "0x89504e47",
        "supply": 1000,
        "tags": ["a", "b"]
    });
    let data = from_metadata(&meta).unwrap();
    assert_eq!(to_metadata(&data).unwrap(), meta);
    assert!(to_metadata(&Data::void()).is_err());
}

#[test]
fn errors_unify() {
    fn decode(raw: &str) -> pdata::Result<Value> {
        from(raw, &Schema::integer())
    }
    assert!(matches!(decode("zz"), Err(Error::Hex(_))));
    assert!(matches!(decode("9f"), Err(Error::Decode(_))));
    assert!(matches!(decode("40"), Err(Error::Cast(_))));
    assert_eq!(decode("05").unwrap(), Value::int(5));
}
