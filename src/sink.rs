//! Decode event sink.
//!
//! The engine does not build display trees itself; each decoded field is
//! reported as an event to an [`EventSink`] supplied by the hosting
//! framework. [`NullSink`] decodes with no events (the "value consumed
//! programmatically only" mode); [`TreeSink`] collects a node tree and is
//! the host stand-in used by tests and benches.

use crate::value::Value;
use std::ops::Range;

/// Field identifier assigned by the hosting framework's registration tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub i32);

impl FieldId {
    /// Decode-only marker: the field has no display registration.
    ///
    /// Decoding proceeds identically; sinks are free to drop events carrying
    /// this id.
    pub const NONE: FieldId = FieldId(-1);
}

/// Receiver for structured decode events.
///
/// Events arrive strictly nested: every `begin_constructed` is closed by a
/// matching `end_constructed`, and `primitive` events fall inside the
/// currently open construct. Byte ranges cover the whole TLV including
/// identifier and length octets.
pub trait EventSink {
    /// A constructed value (SEQUENCE, SET, CHOICE, ...) starts at `start`.
    fn begin_constructed(&mut self, field: FieldId, name: &'static str, start: usize);

    /// The innermost open construct ends at `end` (exclusive).
    fn end_constructed(&mut self, field: FieldId, end: usize);

    /// A primitive value covering `range` was decoded.
    fn primitive(&mut self, field: FieldId, name: &'static str, range: Range<usize>, value: &Value);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn begin_constructed(&mut self, _field: FieldId, _name: &'static str, _start: usize) {}
    fn end_constructed(&mut self, _field: FieldId, _end: usize) {}
    fn primitive(
        &mut self,
        _field: FieldId,
        _name: &'static str,
        _range: Range<usize>,
        _value: &Value,
    ) {
    }
}

/// One node of a collected dissection tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub field: FieldId,
    pub name: &'static str,
    /// Byte range of the whole TLV. For constructed nodes the end is patched
    /// when the construct closes.
    pub range: Range<usize>,
    /// Decoded value for primitive nodes, `None` for constructed ones.
    pub value: Option<Value>,
    pub children: Vec<Node>,
}

impl Node {
    /// Depth-first search for the first node with the given name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Total number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Sink that collects events into a [`Node`] tree.
#[derive(Debug, Default)]
pub struct TreeSink {
    roots: Vec<Node>,
    stack: Vec<Node>,
}

impl TreeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish collection and return the root nodes.
    ///
    /// Unbalanced `begin_constructed` calls (possible when a decode aborted
    /// mid-construct) are closed as-is so partial trees remain inspectable.
    pub fn finish(mut self) -> Vec<Node> {
        while let Some(node) = self.stack.pop() {
            self.attach(node);
        }
        self.roots
    }

    /// Depth-first search across all roots.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.roots.iter().find_map(|r| r.find(name))
    }

    /// The collected root nodes so far (open constructs excluded).
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }
}

impl EventSink for TreeSink {
    fn begin_constructed(&mut self, field: FieldId, name: &'static str, start: usize) {
        self.stack.push(Node {
            field,
            name,
            range: start..start,
            value: None,
            children: Vec::new(),
        });
    }

    fn end_constructed(&mut self, _field: FieldId, end: usize) {
        if let Some(mut node) = self.stack.pop() {
            node.range.end = end;
            self.attach(node);
        }
    }

    fn primitive(&mut self, field: FieldId, name: &'static str, range: Range<usize>, value: &Value) {
        let node = Node {
            field,
            name,
            range,
            value: Some(value.clone()),
            children: Vec::new(),
        };
        self.attach(node);
    }
}
