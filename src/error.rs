//! Error types for ber-dissect.
//!
//! Decode failures carry the byte offset at which they were detected plus the
//! field/type context of the descriptor being walked, so malformed or
//! adversarial captures can be diagnosed without access to the generated
//! tables. All errors are `#[non_exhaustive]` to allow adding new variants
//! without breaking changes.

use crate::ber::tag::Ident;
use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
///
/// Structural kinds (`TruncatedInput`, `MalformedTag`, `MalformedLength`,
/// `NonProgressingDecode`, `NestingTooDeep`, `NoMatchingChoiceAlternative`)
/// are fatal to the whole decode call chain. Recoverable anomalies are
/// reported as [`WarningKind`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Not enough bytes remain in the buffer.
    TruncatedInput { needed: usize, available: usize },
    /// Identifier octets malformed (truncated high-tag-number form, or a
    /// tag number that does not fit in 32 bits).
    MalformedTag,
    /// Length octets malformed (reserved long form, or indefinite length on
    /// a primitive encoding).
    MalformedLength,
    /// Long-form length field wider than the configured maximum.
    LengthTooLong { octets: usize, max: usize },
    /// BIT STRING without an unused-bits octet, or unused-bit count > 7.
    MalformedBitString,
    /// OBJECT IDENTIFIER content empty, truncated mid-arc, or arc overflow.
    MalformedOid,
    /// The next tag does not match a mandatory field or element.
    UnexpectedTag { actual: Ident },
    /// Content violates the expected type's shape.
    UnexpectedContent { detail: &'static str },
    /// No CHOICE alternative matches the next tag.
    NoMatchingChoiceAlternative { actual: Ident },
    /// An element decoder completed without advancing the cursor.
    NonProgressingDecode,
    /// Input nesting exceeds the configured maximum depth.
    NestingTooDeep { max: usize },
    /// No registered handler for an ANY-DEFINED-BY OID and no way to skip.
    UnresolvedAnyType { oid: Oid },
    /// INTEGER does not fit the caller's expected representation.
    IntegerOverflow { length: usize },
    /// Zero-length INTEGER content.
    ZeroLengthInteger,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedInput { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::MalformedTag => write!(f, "malformed identifier octets"),
            Self::MalformedLength => write!(f, "malformed length octets"),
            Self::LengthTooLong { octets, max } => {
                write!(f, "length field of {} octets exceeds maximum {}", octets, max)
            }
            Self::MalformedBitString => write!(f, "malformed BIT STRING"),
            Self::MalformedOid => write!(f, "malformed OBJECT IDENTIFIER"),
            Self::UnexpectedTag { actual } => write!(f, "unexpected tag {}", actual),
            Self::UnexpectedContent { detail } => write!(f, "unexpected content: {}", detail),
            Self::NoMatchingChoiceAlternative { actual } => {
                write!(f, "no CHOICE alternative matches tag {}", actual)
            }
            Self::NonProgressingDecode => {
                write!(f, "element decoder did not advance the cursor")
            }
            Self::NestingTooDeep { max } => {
                write!(f, "nesting exceeds maximum depth {}", max)
            }
            Self::UnresolvedAnyType { oid } => {
                write!(f, "no handler registered for OID {}", oid)
            }
            Self::IntegerOverflow { length } => {
                write!(f, "{}-byte INTEGER does not fit target type", length)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OidErrorKind {
    /// Arc is not a decimal number or does not fit in 32 bits.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Non-fatal decode anomaly kinds.
///
/// Warnings are accumulated on the cursor and attached to the decode result;
/// they never abort decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WarningKind {
    /// Bytes inside a construct matched no descriptor and were skipped.
    TrailingDataIgnored { skipped: usize },
    /// Field walk consumed a different amount than the declared length;
    /// the cursor was resynchronized to the declared extent.
    LengthMismatch { declared: usize, consumed: usize },
    /// Open-type content with an unregistered OID was skipped (lenient mode).
    UnknownOidSkipped { oid: Oid },
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrailingDataIgnored { skipped } => {
                write!(f, "{} trailing bytes ignored", skipped)
            }
            Self::LengthMismatch { declared, consumed } => {
                write!(
                    f,
                    "declared length {} but field walk consumed {}",
                    declared, consumed
                )
            }
            Self::UnknownOidSkipped { oid } => {
                write!(f, "skipped content for unregistered OID {}", oid)
            }
        }
    }
}

/// A non-fatal anomaly recorded during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Byte offset at which the anomaly was detected.
    pub offset: usize,
    pub kind: WarningKind,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at offset {}: {}", self.offset, self.kind)
    }
}

/// Field/type context attached to decode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldContext {
    /// Name of the field being decoded.
    pub field: &'static str,
    /// Name of the enclosing structural type.
    pub type_name: &'static str,
}

impl std::fmt::Display for FieldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while decoding field `{}` of `{}`", self.field, self.type_name)
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// BER decoding error.
    #[error("decode error at offset {offset}{}: {kind}", context.map(|c| format!(" {}", c)).unwrap_or_default())]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
        /// Innermost field/type context, attached by the structural
        /// combinator closest to the failure.
        context: Option<FieldContext>,
    },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode {
            offset,
            kind,
            context: None,
        }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Attach field/type context to a decode error if none is present yet.
    ///
    /// The innermost combinator wins, so the context names the descriptor
    /// closest to the failure.
    pub fn in_field(self, field: &'static str, type_name: &'static str) -> Self {
        match self {
            Self::Decode {
                offset,
                kind,
                context: None,
            } => Self::Decode {
                offset,
                kind,
                context: Some(FieldContext { field, type_name }),
            },
            other => other,
        }
    }

    /// The decode error kind, if this is a decode error.
    pub fn decode_kind(&self) -> Option<&DecodeErrorKind> {
        match self {
            Self::Decode { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// The byte offset at which a decode error was detected.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Decode { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
