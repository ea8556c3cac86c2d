//! Byte strings rendered as hex
//!
//! # Background
//!
//! Every byte string that crosses the public surface of this crate, whether a
//! `Bytes` leaf of Plutus Data, a typed byte field, a permitted literal of a
//! bytes schema or the canonical encoding returned by [`to`](crate::to), is
//! exchanged as a *hex-string*: ASCII characters matching `([0-9a-fA-F]{2})*`,
//! two characters per byte. Case is not significant on input; output is always
//! lowercase.
//!
//! # `HexString`
//!
//! [`HexString`] keeps the decoded bytes in memory and only produces text on
//! demand, so that byte-width checks (`minLength`/`maxLength`) count bytes
//! rather than characters, and equality is never sensitive to the case of the
//! text it was parsed from.
//!
//! `From` conversions are binary-based; `FromStr` and [`HexString::from_hex`]
//! are fallible parses of hex-encoded text. The [`hex`](crate::hex) macro is a
//! panicking shorthand for literals.

use crate::conv::target::Target;
use crate::error::HexConvError;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) mod util {
    use crate::error::HexConvError;

    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    /// Lowercase hex rendering of `bytes`, two characters per byte
    #[must_use]
    pub fn hex_of_bytes(bytes: &[u8]) -> String {
        bytes
            .iter()
            .flat_map(|b| [DIGITS[usize::from(b >> 4)], DIGITS[usize::from(b & 0xf)]])
            .map(char::from)
            .collect()
    }

    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }

    /// Decodes case-insensitive hex text into bytes
    ///
    /// # Errors
    ///
    /// `OddParity` for an odd number of characters, `NonHex` for any
    /// character outside `[0-9a-fA-F]`.
    pub fn bytes_of_hex(src: &str) -> Result<Vec<u8>, HexConvError> {
        let raw = src.as_bytes();
        if raw.len() % 2 != 0 {
            return Err(HexConvError::OddParity(src.to_owned()));
        }
        raw.chunks_exact(2)
            .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| HexConvError::NonHex(src.to_owned()))
    }
}

/// Owned byte string that is parsed from, and displayed as, hex text
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct HexString {
    bytes: Vec<u8>,
}

impl HexString {
    /// Constructs a new, empty `HexString`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Constructs a `HexString` from an existing `Vec<u8>` without copying
    #[inline]
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encodes `text` as its UTF-8 bytes
    ///
    /// # Examples
    ///
    /// ```
    /// # use pdata::HexString;
    /// assert_eq!(HexString::from_text("hi").to_hex(), "6869");
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Interprets the bytes as UTF-8 text, if they are valid UTF-8
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Destructs a `HexString` into its underlying byte-vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes in `self`, which is half the number of
    /// characters in its hex rendering
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns a lowercase hexadecimal encoding of `self`
    ///
    /// # Examples
    ///
    /// ```
    /// # use pdata::HexString;
    /// assert_eq!(HexString::new().to_hex(), "");
    /// assert_eq!(HexString::from(vec![0xde, 0xad, 0xbe, 0xef]).to_hex(), "deadbeef");
    /// ```
    #[inline]
    #[must_use]
    pub fn to_hex(&self) -> String {
        util::hex_of_bytes(&self.bytes)
    }

    /// Attempt to parse a hexadecimally encoded string into the sequence of
    /// bytes it represents
    pub fn from_hex<S>(hex: S) -> Result<Self, HexConvError>
    where
        S: AsRef<str>,
    {
        Ok(Self {
            bytes: util::bytes_of_hex(hex.as_ref())?,
        })
    }

    /// Returns `true` if `other` is a hex-string that represents the
    /// same byte-sequence as `self`; invalid hex never compares equal.
    #[must_use]
    pub fn eq_hex<S>(&self, other: &S) -> bool
    where
        S: AsRef<str> + ?Sized,
    {
        match util::bytes_of_hex(other.as_ref()) {
            Ok(bytes) => bytes == self.bytes,
            Err(_) => false,
        }
    }
}

impl AsRef<[u8]> for HexString {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}

impl std::fmt::Debug for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HexString").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        String::fmt(&self.to_hex(), f)
    }
}

impl Target for HexString {
    fn anticipate(&mut self, extra: usize) {
        self.bytes.anticipate(extra)
    }

    fn create() -> Self {
        HexString { bytes: Vec::new() }
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.bytes.push_one(b)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bytes.push_all(buf)
    }
}

impl From<Vec<u8>> for HexString {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for HexString {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl std::str::FromStr for HexString {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Converts a string-like literal or expression into a HexString by parsing it
/// as hexadecimal
///
/// Will panic if the argument is not a valid hex-string.
#[macro_export]
macro_rules! hex {
    ($s : expr) => {{
        $crate::hexstring::HexString::from_hex($s).expect("hex! macro encountered error")
    }};
}

macro_rules! impl_partialeq_hexstr {
    ( $other:ty ) => {
        impl PartialEq<HexString> for $other {
            #[inline]
            fn eq(&self, other: &HexString) -> bool {
                other.eq_hex(self)
            }
        }

        impl PartialEq<$other> for HexString {
            #[inline]
            fn eq(&self, other: &$other) -> bool {
                self.eq_hex(other)
            }
        }
    };
}

impl_partialeq_hexstr!(&'_ str);
impl_partialeq_hexstr!(String);

impl Serialize for HexString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        HexString::from_hex(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        let lower = HexString::from_hex("deadbeef").unwrap();
        let upper = HexString::from_hex("DEADBEEF").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_hex(), "deadbeef");
        assert_eq!(lower.len(), 4);
    }

    #[test]
    fn parse_failures() {
        assert_eq!(
            HexString::from_hex("abc"),
            Err(HexConvError::OddParity("abc".to_owned()))
        );
        assert_eq!(
            HexString::from_hex("zz"),
            Err(HexConvError::NonHex("zz".to_owned()))
        );
        assert!(HexString::from_hex("é1").is_err());
    }

    #[test]
    fn compare_with_text() {
        let h = hex!("00ff");
        assert!(h == "00FF");
        assert!(h != "00fe");
        assert!(h != "0");
    }

    #[test]
    fn text_helpers() {
        let h = HexString::from_text("lucid");
        assert_eq!(h.as_text(), Some("lucid"));
        assert_eq!(hex!("ff").as_text(), None);
    }

    #[test]
    fn serde_as_hex() {
        let h = hex!("CAFE");
        assert_eq!(serde_json::to_string(&h).unwrap(), "\"cafe\"");
        let back: HexString = serde_json::from_str("\"cafe\"").unwrap();
        assert_eq!(back, h);
        assert!(serde_json::from_str::<HexString>("\"caf\"").is_err());
    }
}
