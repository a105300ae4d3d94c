//! BER (Basic Encoding Rules) decoding per X.690.
//!
//! This module provides the byte cursor, the identifier/length readers, and
//! the primitive value decoders. Parsing is permissive where BER is: all
//! three length forms are accepted, non-minimal integer and length encodings
//! decode normally, and any nonzero BOOLEAN octet is TRUE.

pub mod cursor;
pub mod length;
pub mod primitive;
pub mod tag;

pub use cursor::{Cursor, DecodeMode, DecodeOptions, DEFAULT_MAX_DEPTH};
pub use length::{parse_length, Length, DEFAULT_MAX_LENGTH_OCTETS};
pub use primitive::*;
pub use tag::{parse_ident, universal, Class, Ident};
