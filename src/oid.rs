//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for
//! common OIDs. Beyond display, the dotted-decimal form is the dynamic
//! dispatch key for ANY-DEFINED-BY content (see [`crate::registry`]), so the
//! BER decoder produces [`Oid`] as a first-class value, not a display string.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) allowed in an OID.
///
/// Matches the conventional 128-subidentifier cap; enforced during BER
/// decoding via [`Oid::from_ber()`].
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u32). Uses SmallVec to avoid heap
/// allocation for OIDs with 16 or fewer arcs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g. "1.2.840.113549.1.7.2").
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }

            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;

            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                },
                s,
            ));
        }

        Ok(Self { arcs })
    }

    /// Decode an OBJECT IDENTIFIER from its BER content octets.
    ///
    /// The first subidentifier encodes the first two arcs as `40*X+Y`
    /// (X.690 Section 8.19.4); the rest are base-128 with a continuation
    /// bit. `base_offset` is the buffer position of the content, used for
    /// error reporting.
    pub fn from_ber(data: &[u8], base_offset: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::decode(base_offset, DecodeErrorKind::MalformedOid));
        }

        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        let mut value: u32 = 0;
        let mut in_subid = false;

        for (i, &octet) in data.iter().enumerate() {
            value = value
                .checked_mul(128)
                .and_then(|v| v.checked_add(u32::from(octet & 0x7F)))
                .ok_or_else(|| {
                    Error::decode(base_offset + i, DecodeErrorKind::MalformedOid)
                })?;
            in_subid = true;

            if octet & 0x80 == 0 {
                if arcs.is_empty() {
                    // First subidentifier packs the first two arcs.
                    let (first, second) = if value < 40 {
                        (0, value)
                    } else if value < 80 {
                        (1, value - 40)
                    } else {
                        (2, value - 80)
                    };
                    arcs.push(first);
                    arcs.push(second);
                } else {
                    arcs.push(value);
                }
                if arcs.len() > MAX_OID_LEN {
                    return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    }));
                }
                value = 0;
                in_subid = false;
            }
        }

        if in_subid {
            // Final subidentifier still has its continuation bit set.
            tracing::debug!(
                target: "ber_dissect::oid",
                offset = base_offset,
                "OID truncated mid-subidentifier"
            );
            return Err(Error::decode(
                base_offset + data.len(),
                DecodeErrorKind::MalformedOid,
            ));
        }

        Ok(Self { arcs })
    }

    /// Decode a RELATIVE-OID from its BER content octets.
    ///
    /// Like [`from_ber`](Self::from_ber) but without the 40*X+Y split on the
    /// first subidentifier. Empty content is a legal empty relative OID.
    pub fn from_ber_relative(data: &[u8], base_offset: usize) -> Result<Self> {
        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        let mut value: u32 = 0;
        let mut in_subid = false;

        for (i, &octet) in data.iter().enumerate() {
            value = value
                .checked_mul(128)
                .and_then(|v| v.checked_add(u32::from(octet & 0x7F)))
                .ok_or_else(|| {
                    Error::decode(base_offset + i, DecodeErrorKind::MalformedOid)
                })?;
            in_subid = true;

            if octet & 0x80 == 0 {
                arcs.push(value);
                if arcs.len() > MAX_OID_LEN {
                    return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    }));
                }
                value = 0;
                in_subid = false;
            }
        }

        if in_subid {
            return Err(Error::decode(
                base_offset + data.len(),
                DecodeErrorKind::MalformedOid,
            ));
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

// Debug delegates to the dotted form; derived Debug over SmallVec internals
// is useless in test failure output.
impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Construct an [`Oid`] from literal arcs: `oid!(1, 2, 840, 113549, 1, 7, 2)`.
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ber_basic() {
        // 1.3.6.1 = [0x2B, 0x06, 0x01]
        let oid = Oid::from_ber(&[0x2B, 0x06, 0x01], 0).unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_from_ber_first_octet_split() {
        // 0x2A = 40*1 + 2 -> prefix "1.2"
        let oid = Oid::from_ber(&[0x2A], 0).unwrap();
        assert_eq!(oid.to_string(), "1.2");

        // First arc 2 absorbs the remainder: 0x88 0x37 = 1079 -> 2.999
        let oid = Oid::from_ber(&[0x88, 0x37], 0).unwrap();
        assert_eq!(oid.to_string(), "2.999");
    }

    #[test]
    fn test_from_ber_multibyte_arc() {
        // 1.2.840.113549.1.7.2 (pkcs7-signedData)
        let oid = Oid::from_ber(
            &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02],
            0,
        )
        .unwrap();
        assert_eq!(oid.to_string(), "1.2.840.113549.1.7.2");
    }

    #[test]
    fn test_from_ber_empty() {
        let err = Oid::from_ber(&[], 5).unwrap_err();
        assert_eq!(err.decode_kind(), Some(&DecodeErrorKind::MalformedOid));
        assert_eq!(err.offset(), Some(5));
    }

    #[test]
    fn test_from_ber_truncated_final_arc() {
        // Continuation bit set on the last octet.
        let err = Oid::from_ber(&[0x2B, 0x86], 0).unwrap_err();
        assert_eq!(err.decode_kind(), Some(&DecodeErrorKind::MalformedOid));
    }

    #[test]
    fn test_from_ber_arc_overflow() {
        // Six base-128 octets overflow u32.
        let err = Oid::from_ber(&[0x2B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F], 0).unwrap_err();
        assert_eq!(err.decode_kind(), Some(&DecodeErrorKind::MalformedOid));
    }

    #[test]
    fn test_relative_oid() {
        // 8571.3.2 relative = [0xC2, 0x7B, 0x03, 0x02]
        let oid = Oid::from_ber_relative(&[0xC2, 0x7B, 0x03, 0x02], 0).unwrap();
        assert_eq!(oid.to_string(), "8571.3.2");

        // Empty relative OID is legal.
        let oid = Oid::from_ber_relative(&[], 0).unwrap();
        assert!(oid.is_empty());
    }

    #[test]
    fn test_parse_and_display() {
        let oid = Oid::parse("1.2.840.113549.1.7.2").unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 113549, 1, 7, 2]);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.7.2");
    }

    #[test]
    fn test_parse_invalid_arc() {
        assert!(Oid::parse("1.2.x").is_err());
    }

    #[test]
    fn test_starts_with() {
        let full = oid!(1, 2, 840, 113549, 1, 7, 2);
        let prefix = oid!(1, 2, 840, 113549);
        assert!(full.starts_with(&prefix));
        assert!(!prefix.starts_with(&full));
        assert!(full.starts_with(&Oid::empty()));
    }

    #[test]
    fn test_ordering() {
        // Lexicographic by arcs, prefix sorts first.
        let a = oid!(1, 2, 3);
        let b = oid!(1, 2, 3, 1);
        let c = oid!(1, 2, 4);
        assert!(a < b);
        assert!(b < c);
    }
}
