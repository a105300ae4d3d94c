//! Primitive value decoders.
//!
//! Each decoder reads one TLV at the cursor (verifying the universal tag
//! unless `implicit_tag` is set, in which case a context tag already stood
//! in for it), decodes the content into a [`Value`], emits one sink event
//! covering the whole TLV, and returns the native value. These are the
//! functions the generated per-field wrappers bottom out in.

use crate::ber::cursor::Cursor;
use crate::ber::length::Length;
use crate::ber::tag::{universal, Class};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::sink::{EventSink, FieldId};
use crate::value::{StringKind, TimeKind, Value};
use bytes::{Bytes, BytesMut};

/// Read and verify a primitive TLV header.
///
/// Returns the TLV start offset and the definite content length.
fn read_primitive_header(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    expected: u32,
) -> Result<(usize, usize)> {
    let start = cur.offset();
    let (ident, length) = cur.read_header()?;

    if !implicit_tag && !(ident.class == Class::Universal && ident.number == expected) {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedTag { actual: ident },
        ));
    }
    if ident.constructed {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedContent {
                detail: "constructed encoding of a primitive type",
            },
        ));
    }

    match length {
        Length::Definite(n) => Ok((start, n)),
        // read_header already rejects primitive + indefinite
        Length::Indefinite => Err(Error::decode(start, DecodeErrorKind::MalformedLength)),
    }
}

/// Strip redundant leading sign-extension octets from INTEGER content.
///
/// BER permits non-minimal encodings, so `00 7F` decodes as 127; the strip
/// keeps the sign intact (`00 80` stays two octets).
fn strip_sign_extension(bytes: &[u8]) -> &[u8] {
    let mut s = bytes;
    while s.len() > 1
        && ((s[0] == 0x00 && s[1] & 0x80 == 0) || (s[0] == 0xFF && s[1] & 0x80 != 0))
    {
        s = &s[1..];
    }
    s
}

/// Decode an INTEGER into an i64.
///
/// Fails with `IntegerOverflow` if the (minimized) content exceeds 8 octets;
/// values wider than that need [`decode_big_integer`].
pub fn decode_integer(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<i64> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::INTEGER)?;
    let value = read_integer_content(cur, len)?;
    sink.primitive(field, name, start..cur.offset(), &Value::Integer(value));
    Ok(value)
}

/// Decode an ENUMERATED into an i64 (same content rules as INTEGER).
pub fn decode_enumerated(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<i64> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::ENUMERATED)?;
    let value = read_integer_content(cur, len)?;
    sink.primitive(field, name, start..cur.offset(), &Value::Enumerated(value));
    Ok(value)
}

fn read_integer_content(cur: &mut Cursor<'_>, len: usize) -> Result<i64> {
    if len == 0 {
        return Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::ZeroLengthInteger,
        ));
    }
    let content_start = cur.offset();
    let bytes = cur.read_bytes(len)?;
    let bytes = strip_sign_extension(&bytes);

    if bytes.len() > 8 {
        return Err(Error::decode(
            content_start,
            DecodeErrorKind::IntegerOverflow { length: len },
        ));
    }

    let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &byte in bytes {
        value = (value << 8) | i64::from(byte);
    }
    Ok(value)
}

/// Decode an INTEGER of any width as raw two's-complement content.
///
/// The arbitrary-precision opt-in for values that do not fit an i64, such
/// as X.509 serial numbers.
pub fn decode_big_integer(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<Bytes> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::INTEGER)?;
    if len == 0 {
        return Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::ZeroLengthInteger,
        ));
    }
    let bytes = cur.read_bytes(len)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::BigInteger(bytes.clone()),
    );
    Ok(bytes)
}

/// Decode a BOOLEAN.
///
/// BER permits any nonzero octet as TRUE; non-0xFF truthy encodings are not
/// rejected.
pub fn decode_boolean(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<bool> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::BOOLEAN)?;
    if len != 1 {
        return Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::UnexpectedContent {
                detail: "BOOLEAN content must be a single octet",
            },
        ));
    }
    let value = cur.read_byte()? != 0;
    sink.primitive(field, name, start..cur.offset(), &Value::Boolean(value));
    Ok(value)
}

/// Decode a NULL.
pub fn decode_null(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<()> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::NULL)?;
    if len != 0 {
        return Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::UnexpectedContent {
                detail: "NULL with non-zero content",
            },
        ));
    }
    sink.primitive(field, name, start..cur.offset(), &Value::Null);
    Ok(())
}

/// Decode an OCTET STRING, reassembling BER fragmented (constructed) form.
///
/// A primitive encoding is returned as a zero-copy slice. The constructed
/// form concatenates its fragments in encounter order, recursing into
/// nested constructed fragments and honoring indefinite lengths.
pub fn decode_octet_string(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<Bytes> {
    let start = cur.offset();
    let (ident, length) = cur.read_header()?;

    if !implicit_tag
        && !(ident.class == Class::Universal && ident.number == universal::OCTET_STRING)
    {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedTag { actual: ident },
        ));
    }

    let bytes = if !ident.constructed {
        match length {
            Length::Definite(n) => cur.read_bytes(n)?,
            Length::Indefinite => {
                return Err(Error::decode(start, DecodeErrorKind::MalformedLength))
            }
        }
    } else {
        let mut buf = BytesMut::new();
        collect_fragments(cur, length, &mut buf)?;
        buf.freeze()
    };

    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::OctetString(bytes.clone()),
    );
    Ok(bytes)
}

fn collect_fragments(cur: &mut Cursor<'_>, length: Length, buf: &mut BytesMut) -> Result<()> {
    cur.enter()?;
    match length {
        Length::Definite(n) => {
            if cur.offset().saturating_add(n) > cur.len() {
                return Err(Error::decode(
                    cur.offset(),
                    DecodeErrorKind::TruncatedInput {
                        needed: n,
                        available: cur.remaining(),
                    },
                ));
            }
            let end = cur.offset() + n;
            while cur.offset() < end {
                read_fragment(cur, buf)?;
            }
            if cur.offset() != end {
                return Err(Error::decode(
                    cur.offset(),
                    DecodeErrorKind::UnexpectedContent {
                        detail: "octet string fragment crosses its segment boundary",
                    },
                ));
            }
        }
        Length::Indefinite => {
            while !cur.at_eoc()? {
                read_fragment(cur, buf)?;
            }
            cur.read_eoc()?;
        }
    }
    cur.leave();
    Ok(())
}

fn read_fragment(cur: &mut Cursor<'_>, buf: &mut BytesMut) -> Result<()> {
    let start = cur.offset();
    let (ident, length) = cur.read_header()?;
    if !(ident.class == Class::Universal && ident.number == universal::OCTET_STRING) {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedContent {
                detail: "octet string fragment with a foreign tag",
            },
        ));
    }
    if ident.constructed {
        collect_fragments(cur, length, buf)
    } else {
        match length {
            Length::Definite(n) => {
                buf.extend_from_slice(&cur.read_bytes(n)?);
                Ok(())
            }
            Length::Indefinite => Err(Error::decode(start, DecodeErrorKind::MalformedLength)),
        }
    }
}

/// Decode a BIT STRING.
///
/// The first content octet is the count of unused bits in the final octet
/// (0-7); content must carry at least that octet.
pub fn decode_bit_string(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<(u8, Bytes)> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::BIT_STRING)?;
    if len == 0 {
        return Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::MalformedBitString,
        ));
    }
    let unused = cur.read_byte()?;
    if unused > 7 || (len == 1 && unused != 0) {
        tracing::debug!(
            target: "ber_dissect::primitive",
            offset = cur.offset(),
            unused,
            "BIT STRING unused-bit count out of range"
        );
        return Err(Error::decode(
            cur.offset() - 1,
            DecodeErrorKind::MalformedBitString,
        ));
    }
    let bits = cur.read_bytes(len - 1)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::BitString {
            unused,
            bits: bits.clone(),
        },
    );
    Ok((unused, bits))
}

/// Decode an OBJECT IDENTIFIER into an [`Oid`].
pub fn decode_object_identifier(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<Oid> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::OBJECT_IDENTIFIER)?;
    let content_start = cur.offset();
    let bytes = cur.read_bytes(len)?;
    let oid = Oid::from_ber(&bytes, content_start)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::ObjectIdentifier(oid.clone()),
    );
    Ok(oid)
}

/// Decode an OBJECT IDENTIFIER and retain it on the cursor as the dispatch
/// key for the positionally paired open-type field.
///
/// The ANY-DEFINED-BY pattern: a type field stashes its OID, the value
/// field's [`decode_open_type`](crate::registry::decode_open_type) takes it.
pub fn decode_object_identifier_retained(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<Oid> {
    let oid = decode_object_identifier(implicit_tag, cur, sink, field, name)?;
    cur.retain_oid(oid.clone());
    Ok(oid)
}

/// Decode a RELATIVE-OID.
pub fn decode_relative_oid(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
) -> Result<Oid> {
    let (start, len) = read_primitive_header(implicit_tag, cur, universal::RELATIVE_OID)?;
    let content_start = cur.offset();
    let bytes = cur.read_bytes(len)?;
    let oid = Oid::from_ber_relative(&bytes, content_start)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::RelativeOid(oid.clone()),
    );
    Ok(oid)
}

/// Decode a restricted character string.
///
/// No repertoire validation is performed; the raw bytes are preserved
/// losslessly.
pub fn decode_string(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
    kind: StringKind,
) -> Result<Bytes> {
    let (start, len) = read_primitive_header(implicit_tag, cur, kind.universal_tag())?;
    let bytes = cur.read_bytes(len)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::String {
            kind,
            bytes: bytes.clone(),
        },
    );
    Ok(bytes)
}

/// Decode a UTCTime or GeneralizedTime; raw bytes preserved losslessly.
pub fn decode_time(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    field: FieldId,
    name: &'static str,
    kind: TimeKind,
) -> Result<Bytes> {
    let (start, len) = read_primitive_header(implicit_tag, cur, kind.universal_tag())?;
    let bytes = cur.read_bytes(len)?;
    sink.primitive(
        field,
        name,
        start..cur.offset(),
        &Value::Time {
            kind,
            bytes: bytes.clone(),
        },
    );
    Ok(bytes)
}
