//! Validated names for schema nodes
//!
//! Casting tells a sum-type tag apart from a record field purely by the case
//! of its first letter. [`Tag`] and [`FieldName`] can only be obtained through
//! a checked constructor, so a schema that exists in memory already satisfies
//! the convention and the cast engine never re-inspects characters.
//!
//! * Tags (constructor and enum-variant titles) start with an uppercase letter.
//! * Field names start with a lowercase letter or `_`.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use crate::error::NamingError;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Tag(pub(super) String);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FieldName(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Result<Self, NamingError> {
        let name = name.into();
        match name.chars().next() {
            None => Err(NamingError::Empty),
            Some(c) if c.is_uppercase() => Ok(Self(name)),
            Some(_) => Err(NamingError::ExpectedUppercase(name)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FieldName {
    pub fn new(name: impl Into<String>) -> Result<Self, NamingError> {
        let name = name.into();
        match name.chars().next() {
            None => Err(NamingError::Empty),
            Some(c) if c.is_lowercase() || c == '_' => Ok(Self(name)),
            Some(_) => Err(NamingError::ExpectedLowercase(name)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_name {
    ($name:ident) => {
        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = NamingError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                $name::new(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

impl_name!(Tag);
impl_name!(FieldName);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tags_are_uppercase() {
        assert!(Tag::new("Spend").is_ok());
        assert!(Tag::new("Ünïcode").is_ok());
        assert_eq!(
            Tag::new("spend"),
            Err(NamingError::ExpectedUppercase("spend".into()))
        );
        assert_eq!(
            Tag::new("_Spend"),
            Err(NamingError::ExpectedUppercase("_Spend".into()))
        );
        assert_eq!(Tag::new(""), Err(NamingError::Empty));
    }

    #[test]
    fn fields_are_lowercase() {
        assert!(FieldName::new("amount").is_ok());
        assert!(FieldName::new("_reserved").is_ok());
        assert_eq!(
            FieldName::new("Amount"),
            Err(NamingError::ExpectedLowercase("Amount".into()))
        );
        assert!(FieldName::new("1st").is_err());
    }
}
