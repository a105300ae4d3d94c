//! Field descriptors.
//!
//! A [`FieldDescriptor`] is the static, generated description of one
//! structural field: which tag to expect, who owns the wire tag, whether the
//! field may be absent, and the function that decodes it. Descriptor tables
//! are immutable `'static` data; because the decode slot is a plain `fn`
//! pointer, mutually and self-recursive tables (a Subtree containing a
//! SET OF Subtree, an IncrementalStepRefresh reaching itself through its
//! subordinate updates) are expressed with ordinary forward references and
//! resolved by call-time recursion, never unrolled at table construction.

use crate::ber::cursor::Cursor;
use crate::ber::tag::{Class, Ident};
use crate::error::Result;
use crate::sink::{EventSink, FieldId};
use crate::value::Value;

/// Decode function slot: `(implicit_tag, cursor, sink) -> new offset`.
///
/// The uniform signature shared by primitive wrappers, nested structural
/// decoders, CHOICE dispatchers, and open-type handlers.
pub type DecodeFn = fn(bool, &mut Cursor<'_>, &mut dyn EventSink) -> Result<usize>;

/// Expected tag of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagExpect {
    /// Exact class and tag number.
    Exact(Class, u32),
    /// ANY-wildcard: matches every tag. Used for open types and for
    /// CHOICE-typed members whose alternatives carry the real tags.
    Any,
}

impl TagExpect {
    /// Universal class with the given tag number.
    pub const fn universal(number: u32) -> Self {
        Self::Exact(Class::Universal, number)
    }

    /// Context-specific class with the given tag number.
    pub const fn context(number: u32) -> Self {
        Self::Exact(Class::ContextSpecific, number)
    }

    /// Application class with the given tag number.
    pub const fn application(number: u32) -> Self {
        Self::Exact(Class::Application, number)
    }

    /// Whether a peeked identifier satisfies this expectation.
    ///
    /// Only class and number participate; the constructed bit is checked by
    /// the decoder that consumes the tag, since EXPLICIT wrappers and
    /// fragmented strings legitimately flip it.
    pub fn matches(&self, ident: &Ident) -> bool {
        match self {
            Self::Exact(class, number) => ident.class == *class && ident.number == *number,
            Self::Any => true,
        }
    }
}

/// Who owns and verifies the wire tag of a field.
///
/// Models the IMPLTAG/NOOWNTAG/NOTCHKTAG conventions of generated dissector
/// tables as a sum type, so illegal flag combinations are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tagging {
    /// EXPLICIT tagging: the combinator strips the constructed wrapper tag
    /// and length, then the field decoder consumes the inner value's own
    /// tag.
    Explicit,
    /// IMPLICIT tagging: the field's context tag stands in for the value's
    /// universal tag. The field decoder reads the header but does not verify
    /// class or number.
    Implicit,
    /// The field decoder owns and interprets the next tag itself: CHOICE
    /// members, open types, and untagged aliases of structural types.
    Untagged,
}

/// A DEFAULT value, const-constructible for static tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Null,
}

impl DefaultValue {
    /// Materialize the default as a [`Value`] for the event sink.
    pub fn to_value(self) -> Value {
        match self {
            Self::Boolean(v) => Value::Boolean(v),
            Self::Integer(v) => Value::Integer(v),
            Self::Null => Value::Null,
        }
    }
}

/// Whether a field may be absent from the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Optional,
    /// Absent field takes this value; the combinator emits it to the sink.
    Default(DefaultValue),
}

/// One entry of a generated field table.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// ASN.1 field name, used in events and error context.
    pub name: &'static str,
    /// Display registration id forwarded to the sink.
    pub id: FieldId,
    pub expect: TagExpect,
    pub tagging: Tagging,
    pub presence: Presence,
    pub decode: DecodeFn,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("expect", &self.expect)
            .field("tagging", &self.tagging)
            .field("presence", &self.presence)
            .finish()
    }
}

impl FieldDescriptor {
    /// Mandatory implicitly-tagged field; the common table entry.
    pub const fn new(
        name: &'static str,
        id: FieldId,
        expect: TagExpect,
        tagging: Tagging,
        decode: DecodeFn,
    ) -> Self {
        Self {
            name,
            id,
            expect,
            tagging,
            presence: Presence::Mandatory,
            decode,
        }
    }

    /// Mark the field OPTIONAL.
    pub const fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Give the field a DEFAULT value.
    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.presence = Presence::Default(default);
        self
    }
}

/// Static description of a SEQUENCE or SET type.
#[derive(Debug, Clone, Copy)]
pub struct SequenceType {
    pub name: &'static str,
    pub id: FieldId,
    pub fields: &'static [FieldDescriptor],
}

/// Static description of a SEQUENCE OF / SET OF type.
#[derive(Debug, Clone, Copy)]
pub struct SequenceOfType {
    pub name: &'static str,
    pub id: FieldId,
    pub element: &'static FieldDescriptor,
}

/// Static description of a CHOICE type.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceType {
    pub name: &'static str,
    pub id: FieldId,
    /// Alternatives are scanned in order; [`TagExpect::Any`] alternatives
    /// match unconditionally and belong last so they cannot mask more
    /// specific ones.
    pub alternatives: &'static [FieldDescriptor],
}
