//! Reusable BER/DER decoding engine for table-driven protocol dissectors.
//!
//! This crate is the runtime behind generated ASN.1 dissectors: machine
//! written code describes each SEQUENCE, SET, and CHOICE as a static table
//! of [`FieldDescriptor`](field::FieldDescriptor) entries, and the
//! combinators in [`structure`] walk those tables over a BER encoding,
//! reporting every decoded field to an [`EventSink`](sink::EventSink).
//! Encodings are consumed from an in-memory buffer through a
//! [`Cursor`](ber::Cursor); values come out as zero-copy slices where the
//! wire format permits.
//!
//! BER is accepted in full: definite and indefinite lengths, high tag
//! numbers, fragmented octet strings, and the non-minimal encodings DER
//! forbids. DER input, being a subset, decodes identically.
//!
//! # Example
//!
//! ```
//! use ber_dissect::ber::{primitive, Cursor};
//! use ber_dissect::sink::{FieldId, TreeSink};
//!
//! let mut cur = Cursor::from_slice(&[0x02, 0x01, 0x2A]);
//! let mut sink = TreeSink::new();
//! let n = primitive::decode_integer(false, &mut cur, &mut sink, FieldId::NONE, "answer")?;
//! assert_eq!(n, 42);
//! # Ok::<(), ber_dissect::Error>(())
//! ```
//!
//! Structured types plug nested decoders into parent tables as plain `fn`
//! pointers, so recursive ASN.1 types need no table indirection; see
//! [`structure`] for the combinators and [`registry`] for OID-dispatched
//! ANY-DEFINED-BY open types.

pub mod ber;
pub mod error;
pub mod field;
pub mod oid;
pub mod prelude;
pub mod registry;
pub mod sink;
pub mod structure;
pub mod value;

pub use error::{Error, Result};
pub use oid::Oid;
pub use value::Value;
