//! BER identifier octets.
//!
//! Identifier encoding follows X.690 Section 8.1.2:
//! - Bits 8-7: Class (00=Universal, 01=Application, 10=Context-specific, 11=Private)
//! - Bit 6: Primitive (0) or Constructed (1)
//! - Bits 5-1: Tag number, or all ones (31) to select the multi-octet
//!   high-tag-number form (base-128, continuation bit in bit 8)

use crate::error::{DecodeErrorKind, Error, Result};

/// Tag class (bits 8-7 of the leading identifier octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl Class {
    /// Extract the class from a leading identifier octet.
    pub const fn from_octet(octet: u8) -> Self {
        match octet & 0xC0 {
            0x00 => Self::Universal,
            0x40 => Self::Application,
            0x80 => Self::ContextSpecific,
            _ => Self::Private,
        }
    }
}

impl std::fmt::Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Universal => write!(f, "UNIVERSAL"),
            Self::Application => write!(f, "APPLICATION"),
            Self::ContextSpecific => write!(f, "CONTEXT"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

/// Constructed bit (bit 6).
pub const CONSTRUCTED: u8 = 0x20;

/// Universal tag numbers (X.680 Section 8.4).
pub mod universal {
    pub const EOC: u32 = 0;
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const OBJECT_DESCRIPTOR: u32 = 7;
    pub const EXTERNAL: u32 = 8;
    pub const REAL: u32 = 9;
    pub const ENUMERATED: u32 = 10;
    pub const EMBEDDED_PDV: u32 = 11;
    pub const UTF8_STRING: u32 = 12;
    pub const RELATIVE_OID: u32 = 13;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const TELETEX_STRING: u32 = 20;
    pub const VIDEOTEX_STRING: u32 = 21;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const GRAPHIC_STRING: u32 = 25;
    pub const VISIBLE_STRING: u32 = 26;
    pub const GENERAL_STRING: u32 = 27;
    pub const UNIVERSAL_STRING: u32 = 28;
    pub const CHARACTER_STRING: u32 = 29;
    pub const BMP_STRING: u32 = 30;
}

/// A decoded identifier: class, primitive/constructed bit, tag number.
///
/// Produced transiently by [`parse_ident`] / the cursor's header readers and
/// consumed by the structural combinators' tag matching; never retained
/// beyond the decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident {
    pub class: Class,
    pub constructed: bool,
    pub number: u32,
}

impl Ident {
    /// A universal primitive identifier.
    pub const fn universal(number: u32) -> Self {
        Self {
            class: Class::Universal,
            constructed: false,
            number,
        }
    }

    /// A universal constructed identifier (SEQUENCE, SET).
    pub const fn universal_constructed(number: u32) -> Self {
        Self {
            class: Class::Universal,
            constructed: true,
            number,
        }
    }

    /// True for the identifier half of an end-of-contents marker.
    ///
    /// EOC is structural: the caller must also verify the zero length octet
    /// before treating it as a terminator, and must never forward it to a
    /// primitive value decoder.
    pub const fn is_eoc(&self) -> bool {
        matches!(self.class, Class::Universal) && !self.constructed && self.number == universal::EOC
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}{}]",
            self.class,
            self.number,
            if self.constructed { " constructed" } else { "" }
        )
    }
}

/// Parse identifier octets at the start of `data`.
///
/// Returns the identifier and the number of octets consumed. `base_offset`
/// is used to report error offsets correctly when called from within a
/// decoder.
pub fn parse_ident(data: &[u8], base_offset: usize) -> Result<(Ident, usize)> {
    let first = *data.first().ok_or_else(|| {
        Error::decode(
            base_offset,
            DecodeErrorKind::TruncatedInput {
                needed: 1,
                available: 0,
            },
        )
    })?;

    let class = Class::from_octet(first);
    let constructed = first & CONSTRUCTED != 0;
    let low = u32::from(first & 0x1F);

    if low != 0x1F {
        return Ok((
            Ident {
                class,
                constructed,
                number: low,
            },
            1,
        ));
    }

    // High-tag-number form: base-128 continuation octets.
    let mut number: u32 = 0;
    let mut consumed = 1;
    loop {
        let octet = *data.get(consumed).ok_or_else(|| {
            tracing::debug!(
                target: "ber_dissect::tag",
                offset = base_offset,
                "identifier octets truncated mid-continuation"
            );
            Error::decode(base_offset, DecodeErrorKind::MalformedTag)
        })?;
        consumed += 1;

        number = number
            .checked_mul(128)
            .and_then(|n| n.checked_add(u32::from(octet & 0x7F)))
            .ok_or_else(|| Error::decode(base_offset, DecodeErrorKind::MalformedTag))?;

        if octet & 0x80 == 0 {
            break;
        }
    }

    Ok((
        Ident {
            class,
            constructed,
            number,
        },
        consumed,
    ))
}
