//! End-to-end consumer exercising OID-keyed open-type dispatch the way a
//! generated CMS (RFC 5652) dissector would: a ContentInfo whose content
//! field is decoded by whichever handler its contentType OID selects.

mod common;

use ber_dissect::ber::primitive;
use ber_dissect::ber::tag::universal;
use ber_dissect::error::{DecodeErrorKind, WarningKind};
use ber_dissect::prelude::*;
use ber_dissect::registry::decode_open_type;
use ber_dissect::structure::{decode_sequence, decode_set_of};
use common::{concat, init_tracing, int_tlv, oid_content, tlv};

fn content_type(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_object_identifier_retained(imp, cur, sink, FieldId(1), "contentType")?;
    Ok(cur.offset())
}

// ContentInfo ::= SEQUENCE {
//     contentType  ContentType,
//     content      [0] EXPLICIT ANY DEFINED BY contentType
// }
static CONTENT_INFO: SequenceType = SequenceType {
    name: "ContentInfo",
    id: FieldId(100),
    fields: &[
        FieldDescriptor::new(
            "contentType",
            FieldId(1),
            TagExpect::universal(universal::OBJECT_IDENTIFIER),
            Tagging::Untagged,
            content_type,
        ),
        FieldDescriptor::new(
            "content",
            FieldId(2),
            TagExpect::context(0),
            Tagging::Explicit,
            decode_open_type,
        ),
    ],
};

fn algorithm(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_object_identifier(imp, cur, sink, FieldId(3), "algorithm")?;
    Ok(cur.offset())
}

static ALGORITHM_IDENTIFIER: SequenceType = SequenceType {
    name: "AlgorithmIdentifier",
    id: FieldId(101),
    fields: &[FieldDescriptor::new(
        "algorithm",
        FieldId(3),
        TagExpect::universal(universal::OBJECT_IDENTIFIER),
        Tagging::Untagged,
        algorithm,
    )],
};

static ALGORITHM_ELEM: FieldDescriptor = FieldDescriptor::new(
    "algorithmIdentifier",
    FieldId(101),
    TagExpect::universal(universal::SEQUENCE),
    Tagging::Untagged,
    |imp, cur, sink| decode_sequence(&ALGORITHM_IDENTIFIER, imp, cur, sink),
);

static DIGEST_ALGORITHMS: SequenceOfType = SequenceOfType {
    name: "digestAlgorithms",
    id: FieldId(102),
    element: &ALGORITHM_ELEM,
};

fn e_content(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_octet_string(imp, cur, sink, FieldId(4), "eContent")?;
    Ok(cur.offset())
}

fn e_content_type(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_object_identifier(imp, cur, sink, FieldId(5), "eContentType")?;
    Ok(cur.offset())
}

// EncapsulatedContentInfo ::= SEQUENCE {
//     eContentType  ContentType,
//     eContent      [0] EXPLICIT OCTET STRING OPTIONAL
// }
static ENCAP_CONTENT_INFO: SequenceType = SequenceType {
    name: "EncapsulatedContentInfo",
    id: FieldId(103),
    fields: &[
        FieldDescriptor::new(
            "eContentType",
            FieldId(5),
            TagExpect::universal(universal::OBJECT_IDENTIFIER),
            Tagging::Untagged,
            e_content_type,
        ),
        FieldDescriptor::new(
            "eContent",
            FieldId(4),
            TagExpect::context(0),
            Tagging::Explicit,
            e_content,
        )
        .optional(),
    ],
};

fn version(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    primitive::decode_integer(imp, cur, sink, FieldId(6), "version")?;
    Ok(cur.offset())
}

// SignedData, trimmed to the leading fields a digest check needs.
static SIGNED_DATA: SequenceType = SequenceType {
    name: "SignedData",
    id: FieldId(104),
    fields: &[
        FieldDescriptor::new(
            "version",
            FieldId(6),
            TagExpect::universal(universal::INTEGER),
            Tagging::Untagged,
            version,
        ),
        FieldDescriptor::new(
            "digestAlgorithms",
            FieldId(102),
            TagExpect::universal(universal::SET),
            Tagging::Untagged,
            |imp, cur, sink| decode_set_of(&DIGEST_ALGORITHMS, imp, cur, sink),
        ),
        FieldDescriptor::new(
            "encapContentInfo",
            FieldId(103),
            TagExpect::universal(universal::SEQUENCE),
            Tagging::Untagged,
            |imp, cur, sink| decode_sequence(&ENCAP_CONTENT_INFO, imp, cur, sink),
        ),
    ],
};

fn signed_data(imp: bool, cur: &mut Cursor<'_>, sink: &mut dyn EventSink) -> Result<usize> {
    decode_sequence(&SIGNED_DATA, imp, cur, sink)
}

fn cms_registry() -> DispatchTable {
    let mut table = DispatchTable::new();
    table.register(oid!(1, 2, 840, 113549, 1, 7, 2), "signedData", signed_data);
    table
}

const SHA256: &[u32] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
const ID_DATA: &[u32] = &[1, 2, 840, 113549, 1, 7, 1];
const ID_SIGNED_DATA: &[u32] = &[1, 2, 840, 113549, 1, 7, 2];

fn signed_data_message() -> Vec<u8> {
    let digest_algs = tlv(0x31, &tlv(0x30, &tlv(0x06, &oid_content(SHA256))));
    let e_content = tlv(0xA0, &tlv(0x04, b"hello"));
    let encap = tlv(
        0x30,
        &concat(&[&tlv(0x06, &oid_content(ID_DATA)), &e_content]),
    );
    let signed = tlv(0x30, &concat(&[&int_tlv(1), &digest_algs, &encap]));
    tlv(
        0x30,
        &concat(&[
            &tlv(0x06, &oid_content(ID_SIGNED_DATA)),
            &tlv(0xA0, &signed),
        ]),
    )
}

#[test]
fn signed_data_dispatches_through_registry() {
    init_tracing();
    let data = signed_data_message();
    let registry = cms_registry();
    let mut cur = Cursor::with_registry(bytes::Bytes::from(data.clone()), &registry);
    let mut sink = TreeSink::new();

    let end = decode_sequence(&CONTENT_INFO, false, &mut cur, &mut sink).unwrap();
    assert_eq!(end, data.len());
    assert!(cur.warnings().is_empty());

    let roots = sink.finish();
    let info = &roots[0];
    assert_eq!(info.name, "ContentInfo");
    assert_eq!(
        info.find("contentType").unwrap().value.as_ref().unwrap(),
        &Value::ObjectIdentifier(oid!(1, 2, 840, 113549, 1, 7, 2))
    );

    let signed = info.find("SignedData").unwrap();
    assert_eq!(signed.find("version").unwrap().value, Some(Value::Integer(1)));
    assert_eq!(
        signed
            .find("algorithm")
            .unwrap()
            .value
            .as_ref()
            .unwrap()
            .as_oid()
            .unwrap()
            .to_string(),
        "2.16.840.1.101.3.4.2.1"
    );
    assert_eq!(
        signed.find("eContent").unwrap().value,
        Some(Value::OctetString(bytes::Bytes::from_static(b"hello")))
    );
}

#[test]
fn empty_digest_algorithms_set() {
    let encap = tlv(0x30, &tlv(0x06, &oid_content(ID_DATA)));
    let signed = tlv(
        0x30,
        &concat(&[&int_tlv(1), &tlv(0x31, &[]), &encap]),
    );
    let data = tlv(
        0x30,
        &concat(&[
            &tlv(0x06, &oid_content(ID_SIGNED_DATA)),
            &tlv(0xA0, &signed),
        ]),
    );

    let registry = cms_registry();
    let mut cur = Cursor::with_registry(bytes::Bytes::from(data.clone()), &registry);
    let mut sink = TreeSink::new();
    decode_sequence(&CONTENT_INFO, false, &mut cur, &mut sink).unwrap();

    let roots = sink.finish();
    let algs = roots[0].find("digestAlgorithms").unwrap();
    assert!(algs.children.is_empty());
    // The optional eContent is simply absent.
    assert!(roots[0].find("eContent").is_none());
}

#[test]
fn unknown_content_type_strict_fails() {
    let body = tlv(0xA0, &tlv(0x04, b"opaque"));
    let data = tlv(
        0x30,
        &concat(&[&tlv(0x06, &oid_content(&[1, 2, 3, 4])), &body]),
    );

    let registry = cms_registry();
    let mut cur = Cursor::with_registry(bytes::Bytes::from(data), &registry);
    let err = decode_sequence(&CONTENT_INFO, false, &mut cur, &mut NullSink).unwrap_err();
    assert!(matches!(
        err.decode_kind(),
        Some(DecodeErrorKind::UnresolvedAnyType { .. })
    ));
    // Field context names the failing field.
    assert!(err.to_string().contains("`content`"));
}

#[test]
fn unknown_content_type_lenient_skips_with_warning() {
    init_tracing();
    let body = tlv(0xA0, &tlv(0x04, b"opaque"));
    let data = tlv(
        0x30,
        &concat(&[&tlv(0x06, &oid_content(&[1, 2, 3, 4])), &body]),
    );

    let registry = cms_registry();
    let mut cur = Cursor::with_registry(bytes::Bytes::from(data.clone()), &registry)
        .with_options(DecodeOptions::lenient());
    let mut sink = TreeSink::new();
    let end = decode_sequence(&CONTENT_INFO, false, &mut cur, &mut sink).unwrap();
    assert_eq!(end, data.len());

    assert!(cur.warnings().iter().any(|w| matches!(
        &w.kind,
        WarningKind::UnknownOidSkipped { oid } if oid.to_string() == "1.2.3.4"
    )));
    // The ContentInfo node still exists with the contentType child.
    let roots = sink.finish();
    assert!(roots[0].find("contentType").is_some());
}
