//! Prelude module for convenient imports.
//!
//! This module provides a convenient set of commonly-used types and traits
//! for working with the ber-dissect library.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ber_dissect::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Cursor`], [`Oid`], [`Value`], [`Ident`]
//! - Descriptor tables: [`FieldDescriptor`], [`TagExpect`], [`Tagging`]
//! - Event sinks: [`EventSink`], [`FieldId`], [`TreeSink`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::ber::cursor::{Cursor, DecodeMode, DecodeOptions};
pub use crate::ber::tag::{Class, Ident};
pub use crate::error::{Error, Result};
pub use crate::field::{
    ChoiceType, DecodeFn, DefaultValue, FieldDescriptor, Presence, SequenceOfType, SequenceType,
    TagExpect, Tagging,
};
pub use crate::oid::Oid;
pub use crate::registry::{DispatchTable, OidRegistry};
pub use crate::sink::{EventSink, FieldId, NullSink, TreeSink};
pub use crate::value::Value;

#[doc(no_inline)]
pub use crate::oid;
