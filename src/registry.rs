//! OID-keyed dynamic dispatch for ANY-DEFINED-BY content.
//!
//! Some fields (CMS `OtherKeyAttribute.keyAttrType` selecting the decoder
//! for `keyAttrValue`, ESS `SecurityCategory.type`/`.value`) decode an
//! OBJECT IDENTIFIER first and use it as a runtime key for the decoder of
//! the following content. The registry is a capability handed to the cursor
//! at construction, behind a trait so test doubles can be injected; it is
//! read-only at decode time.

use crate::ber::cursor::{Cursor, DecodeMode};
use crate::ber::length::Length;
use crate::error::{DecodeErrorKind, Error, Result, WarningKind};
use crate::field::DecodeFn;
use crate::oid::Oid;
use crate::sink::EventSink;

/// Resolves an OID to a registered decode callback and display name.
pub trait OidRegistry {
    /// Look up the decode callback registered for an OID.
    fn resolve(&self, oid: &Oid) -> Option<DecodeFn>;

    /// Look up the display name registered for an OID.
    fn resolve_name(&self, oid: &Oid) -> Option<&str>;
}

/// Registry with no entries; the default for cursors built without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRegistry;

impl OidRegistry for EmptyRegistry {
    fn resolve(&self, _oid: &Oid) -> Option<DecodeFn> {
        None
    }

    fn resolve_name(&self, _oid: &Oid) -> Option<&str> {
        None
    }
}

pub(crate) static EMPTY_REGISTRY: EmptyRegistry = EmptyRegistry;

struct Entry {
    name: &'static str,
    decode: DecodeFn,
}

/// Sorted-vector registry implementation.
///
/// Entries are kept sorted by OID; lookup is a binary search. Registration
/// happens once at startup, so insertion cost is irrelevant next to lookup.
#[derive(Default)]
pub struct DispatchTable {
    entries: Vec<(Oid, Entry)>,
}

impl DispatchTable {
    /// Create an empty dispatch table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decode callback for an OID, maintaining sorted order.
    ///
    /// If the OID is already registered, its entry is replaced.
    pub fn register(&mut self, oid: Oid, name: &'static str, decode: DecodeFn) {
        let entry = Entry { name, decode };
        match self.entries.binary_search_by(|(o, _)| o.cmp(&oid)) {
            Ok(idx) => self.entries[idx].1 = entry,
            Err(idx) => self.entries.insert(idx, (oid, entry)),
        }
    }

    /// Number of registered OIDs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, oid: &Oid) -> Option<&Entry> {
        self.entries
            .binary_search_by(|(o, _)| o.cmp(oid))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }
}

impl OidRegistry for DispatchTable {
    fn resolve(&self, oid: &Oid) -> Option<DecodeFn> {
        self.get(oid).map(|e| e.decode)
    }

    fn resolve_name(&self, oid: &Oid) -> Option<&str> {
        self.get(oid).map(|e| e.name)
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Decode an open-type ("ANY DEFINED BY") field.
///
/// Takes the OID retained on the cursor by the positionally preceding OID
/// field and resolves it through the cursor's registry. With a handler, the
/// handler decodes the content and its reported offset is adopted. Without
/// one, strict mode fails with `UnresolvedAnyType`; lenient mode skips the
/// content by its declared length with a warning. Indefinite-length unknown
/// content has no length bound to skip by and is fatal in both modes.
///
/// Matches [`DecodeFn`], so generated tables reference it directly as the
/// decode slot of the value field.
pub fn decode_open_type(
    implicit_tag: bool,
    cur: &mut Cursor<'_>,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    let oid = cur.take_retained_oid().ok_or_else(|| {
        Error::decode(
            cur.offset(),
            DecodeErrorKind::UnexpectedContent {
                detail: "open type without a preceding OID field",
            },
        )
    })?;

    if let Some(handler) = cur.registry().resolve(&oid) {
        tracing::debug!(
            target: "ber_dissect::registry",
            offset = cur.offset(),
            oid = %oid,
            name = cur.registry().resolve_name(&oid).unwrap_or("?"),
            "dispatching open type"
        );
        return handler(implicit_tag, cur, sink);
    }

    match cur.options().mode {
        DecodeMode::Lenient => {
            let (_, length) = cur.peek_header()?;
            if let Length::Definite(_) = length {
                cur.warn(WarningKind::UnknownOidSkipped { oid });
                cur.skip_tlv()?;
                Ok(cur.offset())
            } else {
                Err(Error::decode(
                    cur.offset(),
                    DecodeErrorKind::UnresolvedAnyType { oid },
                ))
            }
        }
        DecodeMode::Strict => Err(Error::decode(
            cur.offset(),
            DecodeErrorKind::UnresolvedAnyType { oid },
        )),
    }
}
