#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use ber_dissect::ber::tag::universal;
use ber_dissect::ber::{primitive, Cursor};
use ber_dissect::prelude::*;
use ber_dissect::structure::{decode_sequence, decode_set_of};

fn item(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_integer(imp, cur, sink, FieldId(1), "item")?;
    Ok(cur.offset())
}

static PAIR: SequenceType = SequenceType {
    name: "Pair",
    id: FieldId(2),
    fields: &[
        FieldDescriptor::new(
            "item",
            FieldId(1),
            TagExpect::universal(universal::INTEGER),
            Tagging::Untagged,
            item,
        ),
        FieldDescriptor::new(
            "wrapped",
            FieldId(3),
            TagExpect::context(0),
            Tagging::Explicit,
            item,
        )
        .optional(),
    ],
};

static NEST: SequenceOfType = SequenceOfType {
    name: "Nest",
    id: FieldId(4),
    element: &NEST_ELEM,
};
static NEST_ELEM: FieldDescriptor = FieldDescriptor::new(
    "nest",
    FieldId(5),
    TagExpect::universal(universal::SET),
    Tagging::Untagged,
    |imp, cur, sink| decode_set_of(&NEST, imp, cur, sink),
);

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Fuzz the primitive decoders
    let mut cur = Cursor::new(bytes.clone());
    let _ = primitive::decode_integer(false, &mut cur, &mut NullSink, FieldId::NONE, "n");

    let mut cur = Cursor::new(bytes.clone());
    let _ = primitive::decode_octet_string(false, &mut cur, &mut NullSink, FieldId::NONE, "s");

    let mut cur = Cursor::new(bytes.clone());
    let _ = primitive::decode_bit_string(false, &mut cur, &mut NullSink, FieldId::NONE, "b");

    let mut cur = Cursor::new(bytes.clone());
    let _ = primitive::decode_object_identifier(false, &mut cur, &mut NullSink, FieldId::NONE, "o");

    // Fuzz TLV skipping (indefinite nesting included)
    let mut cur = Cursor::new(bytes.clone());
    let _ = cur.skip_tlv();

    // Fuzz the structural combinators, strict and lenient
    let mut cur = Cursor::new(bytes.clone());
    let mut sink = TreeSink::new();
    let _ = decode_sequence(&PAIR, false, &mut cur, &mut sink);
    let _ = sink.finish();

    let mut cur = Cursor::new(bytes.clone()).with_options(DecodeOptions::lenient());
    let _ = decode_set_of(&NEST, false, &mut cur, &mut NullSink);
});
