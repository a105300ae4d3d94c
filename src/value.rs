//! Decoded value types.
//!
//! A [`Value`] is the language-native result of one primitive decode. It is
//! scoped to a single decode call; generated code decides whether to retain
//! it (e.g. stashing an OID for a later OID-keyed dispatch). Byte-carrying
//! variants hold zero-copy [`Bytes`] slices of the input buffer.

use crate::oid::Oid;
use bytes::Bytes;

/// Restricted/unrestricted character string flavors.
///
/// The engine performs no character-repertoire validation; the raw bytes are
/// preserved losslessly and the kind only records which universal tag the
/// value carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Utf8,
    Numeric,
    Printable,
    Teletex,
    Videotex,
    Ia5,
    Graphic,
    Visible,
    General,
    Universal,
    Bmp,
}

impl StringKind {
    /// The universal tag number for this string type.
    pub const fn universal_tag(self) -> u32 {
        use crate::ber::tag::universal;
        match self {
            Self::Utf8 => universal::UTF8_STRING,
            Self::Numeric => universal::NUMERIC_STRING,
            Self::Printable => universal::PRINTABLE_STRING,
            Self::Teletex => universal::TELETEX_STRING,
            Self::Videotex => universal::VIDEOTEX_STRING,
            Self::Ia5 => universal::IA5_STRING,
            Self::Graphic => universal::GRAPHIC_STRING,
            Self::Visible => universal::VISIBLE_STRING,
            Self::General => universal::GENERAL_STRING,
            Self::Universal => universal::UNIVERSAL_STRING,
            Self::Bmp => universal::BMP_STRING,
        }
    }
}

/// Time value flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    Utc,
    Generalized,
}

impl TimeKind {
    /// The universal tag number for this time type.
    pub const fn universal_tag(self) -> u32 {
        use crate::ber::tag::universal;
        match self {
            Self::Utc => universal::UTC_TIME,
            Self::Generalized => universal::GENERALIZED_TIME,
        }
    }
}

/// A decoded primitive value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Value {
    Boolean(bool),
    /// INTEGER that fits a native i64.
    Integer(i64),
    /// INTEGER wider than 64 bits: raw two's-complement big-endian content
    /// (X.509 serial numbers commonly need this).
    BigInteger(Bytes),
    Enumerated(i64),
    Null,
    OctetString(Bytes),
    /// BIT STRING content with the unused-bit count of the final octet.
    BitString { unused: u8, bits: Bytes },
    ObjectIdentifier(Oid),
    RelativeOid(Oid),
    /// Character string; raw bytes preserved losslessly, no repertoire check.
    String { kind: StringKind, bytes: Bytes },
    /// UTCTime / GeneralizedTime; raw bytes preserved losslessly.
    Time { kind: TimeKind, bytes: Bytes },
}

impl Value {
    /// Lossy UTF-8 view of string-like values, `None` for other variants.
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Self::String { bytes, .. } | Self::Time { bytes, .. } => {
                Some(String::from_utf8_lossy(bytes))
            }
            _ => None,
        }
    }

    /// The integer value, `None` for other variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) | Self::Enumerated(v) => Some(*v),
            _ => None,
        }
    }

    /// The OID, `None` for other variants.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Self::ObjectIdentifier(oid) | Self::RelativeOid(oid) => Some(oid),
            _ => None,
        }
    }

    /// The raw bytes of byte-carrying variants.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::OctetString(bytes)
            | Self::BigInteger(bytes)
            | Self::BitString { bits: bytes, .. }
            | Self::String { bytes, .. }
            | Self::Time { bytes, .. } => Some(bytes),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::BigInteger(bytes) => {
                write!(f, "0x")?;
                for b in bytes.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Self::Enumerated(v) => write!(f, "enum({})", v),
            Self::Null => write!(f, "NULL"),
            Self::OctetString(bytes) => {
                for b in bytes.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Self::BitString { unused, bits } => {
                for b in bits.iter() {
                    write!(f, "{:02x}", b)?;
                }
                write!(f, " ({} unused)", unused)
            }
            Self::ObjectIdentifier(oid) | Self::RelativeOid(oid) => write!(f, "{}", oid),
            Self::String { bytes, .. } | Self::Time { bytes, .. } => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            }
        }
    }
}
