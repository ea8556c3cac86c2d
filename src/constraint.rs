//! Constraint validators
//!
//! Pure checks run by the cast engine once a node's shape has matched. Each
//! returns the first violated rule; nothing is coerced or clamped.

use std::collections::HashMap;

use num_bigint::BigInt;

use crate::data::Data;
use crate::error::{BoundsError, ConstraintError, LengthError, WidthError};
use crate::hexstring::HexString;
use crate::schema::{BytesSchema, IntegerSchema, ListSchema, MapSchema};

pub fn check_integer(val: &BigInt, schema: &IntegerSchema) -> Result<(), BoundsError> {
    if let Some(min) = &schema.minimum {
        if val < min {
            return Err(BoundsError::Underflow {
                min: min.clone(),
                val: val.clone(),
            });
        }
    }
    if let Some(max) = &schema.maximum {
        if val > max {
            return Err(BoundsError::Overflow {
                max: max.clone(),
                val: val.clone(),
            });
        }
    }
    if let Some(min) = &schema.exclusive_minimum {
        if val <= min {
            return Err(BoundsError::ExclusiveUnderflow {
                min: min.clone(),
                val: val.clone(),
            });
        }
    }
    if let Some(max) = &schema.exclusive_maximum {
        if val >= max {
            return Err(BoundsError::ExclusiveOverflow {
                max: max.clone(),
                val: val.clone(),
            });
        }
    }
    Ok(())
}

/// Checks literal membership first, then the width window
pub fn check_bytes(val: &HexString, schema: &BytesSchema) -> Result<(), ConstraintError> {
    if let Some(literals) = &schema.literals {
        if !literals.contains(val) {
            return Err(ConstraintError::NotInEnum {
                value: val.to_hex(),
            });
        }
    }
    let actual = val.len();
    match (schema.min_length, schema.max_length) {
        (Some(min), _) if actual < min => Err(WidthError::TooNarrow { min, actual }.into()),
        (_, Some(limit)) if actual > limit => Err(WidthError::TooWide { limit, actual }.into()),
        _ => Ok(()),
    }
}

fn check_count(
    actual: usize,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), LengthError> {
    match (min, max) {
        (Some(min), _) if actual < min => Err(LengthError::TooShort { min, actual }),
        (_, Some(limit)) if actual > limit => Err(LengthError::TooLong { limit, actual }),
        _ => Ok(()),
    }
}

/// Cardinality of an array, checked before its elements are cast
pub fn check_list_len(actual: usize, schema: &ListSchema) -> Result<(), ConstraintError> {
    Ok(check_count(actual, schema.min_items, schema.max_items)?)
}

pub fn check_map_len(actual: usize, schema: &MapSchema) -> Result<(), ConstraintError> {
    Ok(check_count(actual, schema.min_items, schema.max_items)?)
}

/// Rejects the first pair of structurally equal elements
///
/// Equality is the derived structural equality of [`Data`], so composite
/// elements are compared in full.
pub fn check_unique(items: &[Data]) -> Result<(), ConstraintError> {
    let mut seen: HashMap<&Data, usize> = HashMap::with_capacity(items.len());
    for (ix, item) in items.iter().enumerate() {
        if let Some(&first) = seen.get(item) {
            return Err(ConstraintError::Duplicate { first, second: ix });
        }
        seen.insert(item, ix);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;
    use crate::schema::Schema;

    #[test]
    fn integer_bounds_are_inclusive() {
        let s = IntegerSchema::default().minimum(0).maximum(10);
        assert!(check_integer(&BigInt::from(0), &s).is_ok());
        assert!(check_integer(&BigInt::from(10), &s).is_ok());
        assert!(matches!(
            check_integer(&BigInt::from(-1), &s),
            Err(BoundsError::Underflow { .. })
        ));
        assert!(matches!(
            check_integer(&BigInt::from(11), &s),
            Err(BoundsError::Overflow { .. })
        ));
    }

    #[test]
    fn integer_bounds_exclusive() {
        let s = IntegerSchema::default()
            .exclusive_minimum(0)
            .exclusive_maximum(10);
        assert!(check_integer(&BigInt::from(1), &s).is_ok());
        assert!(check_integer(&BigInt::from(0), &s).is_err());
        assert!(check_integer(&BigInt::from(10), &s).is_err());
    }

    #[test]
    fn fixed_width_bytes() {
        let s = BytesSchema::from(2);
        assert!(check_bytes(&hex!("abcd"), &s).is_ok());
        assert_eq!(
            check_bytes(&hex!("ab"), &s),
            Err(ConstraintError::Width(WidthError::TooNarrow { min: 2, actual: 1 }))
        );
        assert_eq!(
            check_bytes(&hex!("abcdef"), &s),
            Err(ConstraintError::Width(WidthError::TooWide { limit: 2, actual: 3 }))
        );
    }

    #[test]
    fn byte_literals() {
        let s = BytesSchema::default().literals(vec![hex!("00"), hex!("ff")]);
        assert!(check_bytes(&hex!("FF"), &s).is_ok());
        assert_eq!(
            check_bytes(&hex!("01"), &s),
            Err(ConstraintError::NotInEnum { value: "01".into() })
        );
    }

    #[test]
    fn uniqueness() {
        let xs = vec![
            Data::Bytes(hex!("aa")),
            Data::Bytes(hex!("bb")),
            Data::Bytes(hex!("aa")),
        ];
        assert_eq!(
            check_unique(&xs),
            Err(ConstraintError::Duplicate { first: 0, second: 2 })
        );
        assert!(check_unique(&xs[..2]).is_ok());
        let nested = vec![Data::constr(0, vec![Data::int(1)]), Data::constr(0, vec![Data::int(1)])];
        assert!(check_unique(&nested).is_err());
    }

    #[test]
    fn cardinality() {
        let Schema::List(s) = Schema::array_with(Schema::integer(), 2usize) else {
            panic!("expected list")
        };
        assert!(check_list_len(2, &s).is_ok());
        assert!(check_list_len(1, &s).is_err());
        assert!(check_list_len(3, &s).is_err());
    }
}
