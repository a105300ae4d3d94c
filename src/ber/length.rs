//! BER length octets.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: single octet, bit 8=0, value 0-127
//! - Long form: initial octet (bit 8=1, bits 7-1=count), followed by count
//!   length octets, big-endian
//! - Indefinite form (0x80): content runs until an end-of-contents marker;
//!   legal on constructed encodings only

use crate::error::{DecodeErrorKind, Error, Result};

/// Default maximum width of a long-form length field, in octets.
///
/// Four octets cover any buffer a dissector will realistically see; wider
/// fields are almost always hostile input. Callers decoding unusual corpora
/// can raise the limit to 8 via `DecodeOptions::max_length_octets`.
pub const DEFAULT_MAX_LENGTH_OCTETS: usize = 4;

/// A decoded length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Declared content length in bytes.
    Definite(usize),
    /// Content runs until an end-of-contents marker.
    Indefinite,
}

impl Length {
    /// The declared byte count, if definite.
    pub fn definite(&self) -> Option<usize> {
        match self {
            Self::Definite(n) => Some(*n),
            Self::Indefinite => None,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, Self::Indefinite)
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definite(n) => write!(f, "{}", n),
            Self::Indefinite => write!(f, "indefinite"),
        }
    }
}

/// Parse length octets at the start of `data`.
///
/// Returns the length and the number of octets consumed. `max_octets` caps
/// the long-form width (see [`DEFAULT_MAX_LENGTH_OCTETS`]); `base_offset` is
/// used to report error offsets correctly when called from within a decoder.
///
/// Non-minimal long-form encodings (e.g. `82 00 05` for length 5) are
/// accepted per X.690 Section 8.1.3.5 Note 2.
pub fn parse_length(data: &[u8], base_offset: usize, max_octets: usize) -> Result<(Length, usize)> {
    let first = *data.first().ok_or_else(|| {
        Error::decode(
            base_offset,
            DecodeErrorKind::TruncatedInput {
                needed: 1,
                available: 0,
            },
        )
    })?;

    if first == 0x80 {
        return Ok((Length::Indefinite, 1));
    }

    if first & 0x80 == 0 {
        // Short form
        return Ok((Length::Definite(first as usize), 1));
    }

    // Long form
    let num_octets = (first & 0x7F) as usize;

    if num_octets == 0x7F {
        // 0xFF is reserved by X.690 8.1.3.6
        return Err(Error::decode(base_offset, DecodeErrorKind::MalformedLength));
    }

    if num_octets > max_octets {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong {
                octets: num_octets,
                max: max_octets,
            },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::TruncatedInput {
                needed: 1 + num_octets,
                available: data.len(),
            },
        ));
    }

    let mut len: usize = 0;
    for &octet in &data[1..=num_octets] {
        len = len
            .checked_mul(256)
            .and_then(|l| l.checked_add(octet as usize))
            .ok_or_else(|| Error::decode(base_offset, DecodeErrorKind::MalformedLength))?;
    }

    Ok((Length::Definite(len), 1 + num_octets))
}
