//! Structural combinators.
//!
//! These walk the generated descriptor tables: SEQUENCE matches fields in
//! table order, SET matches elements against the table by tag, SEQUENCE OF /
//! SET OF repeat one element descriptor, and CHOICE selects an alternative
//! by the peeked identifier. All of them have the shape of a [`DecodeFn`]
//! once partially applied to their `'static` type description, which is how
//! generated code plugs nested structures into parent tables.
//!
//! A declared definite length is authoritative: when the fields consume more
//! or less than declared, the combinator records a [`LengthMismatch`]
//! warning and resynchronizes the cursor to the declared end, so one
//! malformed construct does not desynchronize its siblings.
//!
//! [`DecodeFn`]: crate::field::DecodeFn
//! [`LengthMismatch`]: crate::error::WarningKind::LengthMismatch

use crate::ber::cursor::{Cursor, DecodeMode};
use crate::ber::length::Length;
use crate::ber::tag::{universal, Class, Ident};
use crate::error::{DecodeErrorKind, Error, Result, WarningKind};
use crate::field::{ChoiceType, FieldDescriptor, Presence, SequenceOfType, SequenceType, Tagging};
use crate::sink::{EventSink, FieldId};
use smallvec::SmallVec;

/// Extent of an open constructed value.
struct Construct {
    content_start: usize,
    /// Declared end of content, `None` for the indefinite form.
    end: Option<usize>,
}

/// Consume a constructed header and establish its content extent.
fn open_construct(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    expected: u32,
) -> Result<(usize, Construct)> {
    let start = cur.offset();
    let (ident, length) = cur.read_header()?;

    if !implicit_tag && !(ident.class == Class::Universal && ident.number == expected) {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedTag { actual: ident },
        ));
    }
    if !ident.constructed {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedContent {
                detail: "primitive encoding of a constructed type",
            },
        ));
    }

    let content_start = cur.offset();
    let end = match length {
        Length::Definite(n) => {
            if content_start.saturating_add(n) > cur.len() {
                return Err(Error::decode(
                    content_start,
                    DecodeErrorKind::TruncatedInput {
                        needed: n,
                        available: cur.remaining(),
                    },
                ));
            }
            Some(content_start + n)
        }
        Length::Indefinite => None,
    };
    Ok((start, Construct { content_start, end }))
}

/// Close a construct, enforcing the declared length or consuming the EOC.
///
/// Unconsumed elements before an indefinite construct's terminator are
/// trailer padding: they are skipped with a [`TrailingDataIgnored`] warning
/// rather than failing the decode.
///
/// [`TrailingDataIgnored`]: crate::error::WarningKind::TrailingDataIgnored
fn close_construct(cur: &mut Cursor<'_>, construct: &Construct) -> Result<()> {
    match construct.end {
        Some(end) => {
            if cur.offset() != end {
                cur.warn(WarningKind::LengthMismatch {
                    declared: end - construct.content_start,
                    consumed: cur.offset().abs_diff(construct.content_start),
                });
                cur.seek(end);
            }
            Ok(())
        }
        None => {
            if !cur.at_eoc()? {
                let start = cur.offset();
                while !cur.at_eoc()? {
                    cur.skip_tlv()?;
                }
                cur.warn(WarningKind::TrailingDataIgnored {
                    skipped: cur.offset() - start,
                });
            }
            cur.read_eoc()
        }
    }
}

/// Whether content remains before the construct's end.
fn has_content(cur: &Cursor<'_>, construct: &Construct) -> Result<bool> {
    match construct.end {
        Some(end) => Ok(cur.offset() < end),
        None => Ok(!cur.at_eoc()?),
    }
}

/// Decode one field through its descriptor, honoring its tagging mode.
fn decode_member(
    fd: &FieldDescriptor,
    type_name: &'static str,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let result = match fd.tagging {
        Tagging::Explicit => decode_explicit(fd, cur, sink),
        Tagging::Implicit => (fd.decode)(true, cur, sink).map(drop),
        Tagging::Untagged => (fd.decode)(false, cur, sink).map(drop),
    };
    result.map_err(|e| e.in_field(fd.name, type_name))
}

/// Strip an EXPLICIT wrapper and decode the inner value by its own tag.
fn decode_explicit(
    fd: &FieldDescriptor,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let start = cur.offset();
    let (ident, length) = cur.read_header()?;
    if !ident.constructed {
        return Err(Error::decode(
            start,
            DecodeErrorKind::UnexpectedContent {
                detail: "primitive encoding of an explicit tag wrapper",
            },
        ));
    }
    let content_start = cur.offset();
    let wrapper = match length {
        Length::Definite(n) => {
            if content_start.saturating_add(n) > cur.len() {
                return Err(Error::decode(
                    content_start,
                    DecodeErrorKind::TruncatedInput {
                        needed: n,
                        available: cur.remaining(),
                    },
                ));
            }
            Construct {
                content_start,
                end: Some(content_start + n),
            }
        }
        Length::Indefinite => Construct {
            content_start,
            end: None,
        },
    };

    cur.enter()?;
    (fd.decode)(false, cur, sink)?;
    close_construct(cur, &wrapper)?;
    cur.leave();
    Ok(())
}

/// Emit an absent-with-DEFAULT field as a zero-width synthetic event.
fn emit_default(fd: &FieldDescriptor, cur: &Cursor<'_>, sink: &mut dyn EventSink) {
    if let Presence::Default(default) = fd.presence {
        let at = cur.offset();
        sink.primitive(fd.id, fd.name, at..at, &default.to_value());
    }
}

fn missing_field(fd: &FieldDescriptor, type_name: &'static str, offset: usize) -> Error {
    Error::decode(
        offset,
        DecodeErrorKind::UnexpectedContent {
            detail: "mandatory field absent",
        },
    )
    .in_field(fd.name, type_name)
}

/// Decode a SEQUENCE against its field table, in table order.
///
/// An element whose tag does not match the next descriptor skips over
/// OPTIONAL and DEFAULT entries (emitting defaults) until a match or a
/// mandatory mismatch.
pub fn decode_sequence(
    ty: &'static SequenceType,
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    let (start, construct) = open_construct(implicit_tag, cur, universal::SEQUENCE)?;
    cur.enter()?;
    sink.begin_constructed(ty.id, ty.name, start);

    for fd in ty.fields {
        if has_content(cur, &construct)? {
            let at = cur.offset();
            let ident = cur.peek_ident()?;
            if !ident.is_eoc() && fd.expect.matches(&ident) {
                decode_member(fd, ty.name, cur, sink)?;
                continue;
            }
            match fd.presence {
                Presence::Mandatory => {
                    return Err(Error::decode(
                        at,
                        DecodeErrorKind::UnexpectedTag { actual: ident },
                    )
                    .in_field(fd.name, ty.name));
                }
                Presence::Optional => {}
                Presence::Default(_) => emit_default(fd, cur, sink),
            }
        } else {
            match fd.presence {
                Presence::Mandatory => return Err(missing_field(fd, ty.name, cur.offset())),
                Presence::Optional => {}
                Presence::Default(_) => emit_default(fd, cur, sink),
            }
        }
    }

    close_construct(cur, &construct)?;
    sink.end_constructed(ty.id, cur.offset());
    cur.leave();
    Ok(cur.offset())
}

/// Decode a SET against its field table, matching elements by tag.
///
/// DER element order is not assumed: each encountered element is matched
/// against the not-yet-seen descriptors. A second element for an
/// already-seen field, or one matching no descriptor, is an error in strict
/// mode and skipped with a warning in lenient mode.
pub fn decode_set(
    ty: &'static SequenceType,
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    let (start, construct) = open_construct(implicit_tag, cur, universal::SET)?;
    cur.enter()?;
    sink.begin_constructed(ty.id, ty.name, start);

    let mut seen: SmallVec<[bool; 16]> = SmallVec::from_elem(false, ty.fields.len());

    while has_content(cur, &construct)? {
        let at = cur.offset();
        let ident = cur.peek_ident()?;
        if ident.is_eoc() {
            break;
        }
        let matched = ty
            .fields
            .iter()
            .enumerate()
            .position(|(i, fd)| !seen[i] && fd.expect.matches(&ident));
        match matched {
            Some(i) => {
                seen[i] = true;
                decode_member(&ty.fields[i], ty.name, cur, sink)?;
                if cur.offset() <= at {
                    return Err(Error::decode(at, DecodeErrorKind::NonProgressingDecode));
                }
            }
            None => {
                if cur.options().mode == DecodeMode::Strict {
                    return Err(Error::decode(
                        at,
                        DecodeErrorKind::UnexpectedTag { actual: ident },
                    ));
                }
                cur.skip_tlv()?;
                cur.warn(WarningKind::TrailingDataIgnored {
                    skipped: cur.offset() - at,
                });
            }
        }
    }

    for (i, fd) in ty.fields.iter().enumerate() {
        if !seen[i] {
            match fd.presence {
                Presence::Mandatory => return Err(missing_field(fd, ty.name, cur.offset())),
                Presence::Optional => {}
                Presence::Default(_) => emit_default(fd, cur, sink),
            }
        }
    }

    close_construct(cur, &construct)?;
    sink.end_constructed(ty.id, cur.offset());
    cur.leave();
    Ok(cur.offset())
}

fn decode_repeated(
    ty: &'static SequenceOfType,
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
    expected: u32,
) -> Result<usize> {
    let (start, construct) = open_construct(implicit_tag, cur, expected)?;
    cur.enter()?;
    sink.begin_constructed(ty.id, ty.name, start);

    while has_content(cur, &construct)? {
        let at = cur.offset();
        let ident = cur.peek_ident()?;
        if ident.is_eoc() {
            break;
        }
        if !ty.element.expect.matches(&ident) {
            return Err(
                Error::decode(at, DecodeErrorKind::UnexpectedTag { actual: ident })
                    .in_field(ty.element.name, ty.name),
            );
        }
        decode_member(ty.element, ty.name, cur, sink)?;
        // A zero-width element TLV cannot exist, so no progress means a
        // decoder bug or hostile input; bail rather than spin.
        if cur.offset() <= at {
            return Err(Error::decode(at, DecodeErrorKind::NonProgressingDecode));
        }
    }

    close_construct(cur, &construct)?;
    sink.end_constructed(ty.id, cur.offset());
    cur.leave();
    Ok(cur.offset())
}

/// Decode a SEQUENCE OF: zero or more elements of one descriptor.
pub fn decode_sequence_of(
    ty: &'static SequenceOfType,
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    decode_repeated(ty, implicit_tag, cur, sink, universal::SEQUENCE)
}

/// Decode a SET OF. Identical iteration to SEQUENCE OF under the SET tag;
/// no DER ordering check is made on the elements.
pub fn decode_set_of(
    ty: &'static SequenceOfType,
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    decode_repeated(ty, implicit_tag, cur, sink, universal::SET)
}

/// Pick the CHOICE alternative matching a peeked identifier.
///
/// Alternatives are scanned in table order; an end-of-contents marker never
/// matches, even against a wildcard alternative.
pub fn select_alternative(ty: &ChoiceType, ident: &Ident) -> Option<usize> {
    if ident.is_eoc() {
        return None;
    }
    ty.alternatives.iter().position(|fd| fd.expect.matches(ident))
}

/// Decode a CHOICE by peeking the identifier and dispatching the matching
/// alternative.
///
/// A CHOICE has no tag of its own, so `implicit_tag` does not apply (BER
/// turns an implicitly tagged CHOICE into an explicit one) and is ignored.
/// With a display registration ([`FieldId`] other than `NONE`) the choice
/// wraps its alternative in one constructed node; with `NONE` the
/// alternative's events pass through unwrapped.
pub fn decode_choice(
    ty: &'static ChoiceType,
    _implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    let at = cur.offset();
    let ident = cur.peek_ident()?;
    let idx = select_alternative(ty, &ident).ok_or_else(|| {
        Error::decode(
            at,
            DecodeErrorKind::NoMatchingChoiceAlternative { actual: ident },
        )
    })?;

    let fd = &ty.alternatives[idx];
    tracing::debug!(
        target: "ber_dissect::structure",
        offset = at,
        choice = ty.name,
        alternative = fd.name,
        "selected CHOICE alternative"
    );

    // A CHOICE consumes no tag of its own, so a degenerate self-referential
    // table could otherwise recurse without advancing the cursor; counting
    // it against the depth limit keeps the guard unconditional.
    cur.enter()?;
    let wrap = ty.id != FieldId::NONE;
    if wrap {
        sink.begin_constructed(ty.id, ty.name, at);
    }
    decode_member(fd, ty.name, cur, sink)?;
    if wrap {
        sink.end_constructed(ty.id, cur.offset());
    }
    cur.leave();
    Ok(cur.offset())
}
