//! Byte cursor and decode context.
//!
//! A [`Cursor`] wraps the input buffer, the mutable read offset, and the
//! per-call decode context (options, nesting depth, accumulated warnings,
//! the retained ANY-DEFINED-BY dispatch OID, and the OID registry). It is
//! created at entry to a top-level decode call, passed by mutable reference
//! through every recursive call, and fully discarded at return; there is no
//! persistent state across independent top-level invocations.
//!
//! On failure the offset is left at the position where the failure was
//! detected; callers must not assume rollback.

use crate::ber::length::{self, parse_length, Length};
use crate::ber::tag::{parse_ident, Ident};
use crate::error::{DecodeErrorKind, Error, Result, Warning, WarningKind};
use crate::oid::Oid;
use crate::registry::{OidRegistry, EMPTY_REGISTRY};
use bytes::Bytes;

/// Default maximum structural nesting depth.
///
/// Input nesting depth is attacker-controlled for untrusted capture data, so
/// the engine fails with `NestingTooDeep` rather than overflow the call
/// stack. Raise via [`DecodeOptions::max_depth`] for unusual corpora.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// How the engine treats recoverable anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Fail fast: open types without a registered handler are fatal, and an
    /// unmatched element inside a SET is an error.
    #[default]
    Strict,
    /// Best-effort tolerance for untrusted or partial captures: skip what
    /// can be skipped by length, recording warnings.
    Lenient,
}

/// Caller-supplied decode configuration.
///
/// Constructed once and passed into [`Cursor::with_options`]; no static
/// mutable configuration exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum structural nesting depth before `NestingTooDeep`.
    pub max_depth: usize,
    /// Strict or lenient anomaly handling.
    pub mode: DecodeMode,
    /// Maximum width of a long-form length field, in octets (up to 8).
    pub max_length_octets: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mode: DecodeMode::Strict,
            max_length_octets: length::DEFAULT_MAX_LENGTH_OCTETS,
        }
    }
}

impl DecodeOptions {
    /// Lenient-mode options with the remaining defaults.
    pub fn lenient() -> Self {
        Self {
            mode: DecodeMode::Lenient,
            ..Self::default()
        }
    }
}

/// Byte cursor over an in-memory BER encoding.
pub struct Cursor<'a> {
    data: Bytes,
    offset: usize,
    depth: usize,
    options: DecodeOptions,
    warnings: Vec<Warning>,
    retained_oid: Option<Oid>,
    registry: &'a dyn OidRegistry,
}

impl<'a> Cursor<'a> {
    /// Create a cursor with default options and an empty OID registry.
    pub fn new(data: Bytes) -> Self {
        Self::with_registry(data, &EMPTY_REGISTRY)
    }

    /// Create a cursor from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Create a cursor with an OID registry for ANY-DEFINED-BY dispatch.
    pub fn with_registry(data: Bytes, registry: &'a dyn OidRegistry) -> Self {
        Self {
            data,
            offset: 0,
            depth: 0,
            options: DecodeOptions::default(),
            warnings: Vec::new(),
            retained_oid: None,
            registry,
        }
    }

    /// Replace the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// The decode options in effect.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The OID registry for open-type dispatch.
    pub fn registry(&self) -> &'a dyn OidRegistry {
        self.registry
    }

    /// Current offset into the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes remaining after the offset.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if the cursor has reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next byte without consuming it.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.offset).copied().ok_or_else(|| {
            Error::decode(
                self.offset,
                DecodeErrorKind::TruncatedInput {
                    needed: 1,
                    available: 0,
                },
            )
        })
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.offset += 1;
        Ok(byte)
    }

    /// Read `len` bytes as a zero-copy slice of the input buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add so a hostile length cannot bypass the bounds check
        if self.offset.saturating_add(len) > self.data.len() {
            tracing::debug!(
                target: "ber_dissect::cursor",
                offset = self.offset,
                needed = len,
                available = self.remaining(),
                "insufficient data"
            );
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::TruncatedInput {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Move the offset to an absolute position within the buffer.
    ///
    /// Used by the combinators to resynchronize to an authoritative declared
    /// length. `pos` may be before or after the current offset but must lie
    /// within the buffer.
    pub(crate) fn seek(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len());
        self.offset = pos.min(self.data.len());
    }

    /// Peek the next identifier without consuming it.
    pub fn peek_ident(&self) -> Result<Ident> {
        parse_ident(&self.data[self.offset..], self.offset).map(|(ident, _)| ident)
    }

    /// Peek the next identifier + length pair without consuming either.
    pub fn peek_header(&self) -> Result<(Ident, Length)> {
        let (ident, consumed) = parse_ident(&self.data[self.offset..], self.offset)?;
        let (length, _) = parse_length(
            &self.data[self.offset + consumed..],
            self.offset + consumed,
            self.options.max_length_octets,
        )?;
        Ok((ident, length))
    }

    /// Read identifier octets.
    pub fn read_ident(&mut self) -> Result<Ident> {
        let (ident, consumed) = parse_ident(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(ident)
    }

    /// Read length octets.
    pub fn read_length(&mut self) -> Result<Length> {
        let (len, consumed) = parse_length(
            &self.data[self.offset..],
            self.offset,
            self.options.max_length_octets,
        )?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read one identifier + length pair.
    ///
    /// Rejects the indefinite form on primitive encodings (X.690 8.1.3.2
    /// permits it on constructed encodings only).
    pub fn read_header(&mut self) -> Result<(Ident, Length)> {
        let ident = self.read_ident()?;
        let length = self.read_length()?;
        if length.is_indefinite() && !ident.constructed {
            tracing::debug!(
                target: "ber_dissect::cursor",
                offset = self.offset,
                tag = %ident,
                "indefinite length on primitive encoding"
            );
            return Err(Error::decode(self.offset, DecodeErrorKind::MalformedLength));
        }
        Ok((ident, length))
    }

    /// Check whether the cursor sits on an end-of-contents marker.
    ///
    /// Fails with `TruncatedInput` if the buffer ends where an indefinite
    /// construct still needs content or its terminator.
    pub fn at_eoc(&self) -> Result<bool> {
        match (self.data.get(self.offset), self.data.get(self.offset + 1)) {
            (Some(0), Some(0)) => Ok(true),
            (Some(0), None) => Err(Error::decode(
                self.offset,
                DecodeErrorKind::TruncatedInput {
                    needed: 2,
                    available: 1,
                },
            )),
            (Some(_), _) => Ok(false),
            (None, _) => Err(Error::decode(
                self.offset,
                DecodeErrorKind::TruncatedInput {
                    needed: 2,
                    available: 0,
                },
            )),
        }
    }

    /// Consume an end-of-contents marker.
    ///
    /// EOC is structural: it closes an indefinite-length construct and is
    /// never forwarded to a value decoder.
    pub fn read_eoc(&mut self) -> Result<()> {
        let start = self.offset;
        let (ident, length) = self.read_header()?;
        if !ident.is_eoc() || length != Length::Definite(0) {
            return Err(Error::decode(
                start,
                DecodeErrorKind::UnexpectedContent {
                    detail: "expected end-of-contents marker",
                },
            ));
        }
        Ok(())
    }

    /// Skip one complete TLV, including nested indefinite constructs.
    pub fn skip_tlv(&mut self) -> Result<()> {
        let (_, length) = self.read_header()?;
        match length {
            Length::Definite(n) => {
                if self.offset.saturating_add(n) > self.data.len() {
                    return Err(Error::decode(
                        self.offset,
                        DecodeErrorKind::TruncatedInput {
                            needed: n,
                            available: self.remaining(),
                        },
                    ));
                }
                self.offset += n;
            }
            Length::Indefinite => {
                self.enter()?;
                while !self.at_eoc()? {
                    self.skip_tlv()?;
                }
                self.read_eoc()?;
                self.leave();
            }
        }
        Ok(())
    }

    /// Enter one structural nesting level, enforcing the depth limit.
    ///
    /// Every successful `enter` must be paired with [`leave`](Self::leave)
    /// on the non-error path; on error the whole decode aborts and the
    /// cursor is discarded, so unwinding paths need not restore the depth.
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            tracing::debug!(
                target: "ber_dissect::cursor",
                offset = self.offset,
                max = self.options.max_depth,
                "nesting depth limit reached"
            );
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::NestingTooDeep {
                    max: self.options.max_depth,
                },
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave one structural nesting level.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record a non-fatal anomaly at the current offset.
    pub fn warn(&mut self, kind: WarningKind) {
        tracing::warn!(
            target: "ber_dissect::decode",
            offset = self.offset,
            warning = %kind,
            "decode anomaly"
        );
        self.warnings.push(Warning {
            offset: self.offset,
            kind,
        });
    }

    /// Warnings accumulated so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consume the cursor and return the accumulated warnings.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Stash a just-decoded OID for the positionally paired open-type field.
    ///
    /// The pairing is per the field table: the next open-type decode takes
    /// the OID; no other state may intervene.
    pub fn retain_oid(&mut self, oid: Oid) {
        self.retained_oid = Some(oid);
    }

    /// Take the retained dispatch OID, if any.
    pub fn take_retained_oid(&mut self) -> Option<Oid> {
        self.retained_oid.take()
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset)
            .field("len", &self.data.len())
            .field("depth", &self.depth)
            .field("warnings", &self.warnings.len())
            .finish()
    }
}
