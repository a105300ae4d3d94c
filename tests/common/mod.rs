//! Shared test utilities for ber-dissect integration tests.

// Allow dead code since not all test files use all utilities
#![allow(dead_code)]

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install the env-filtered test subscriber once per test binary.
///
/// Run with `RUST_LOG=ber_dissect=debug` to surface decode traces.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encode one TLV with a single-octet tag and a definite length.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    push_length(&mut out, content.len());
    out.extend_from_slice(content);
    out
}

/// Encode one TLV with the indefinite length form and trailing EOC.
pub fn indefinite(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag, 0x80];
    out.extend_from_slice(content);
    out.extend_from_slice(&[0x00, 0x00]);
    out
}

fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let be = len.to_be_bytes();
        let skip = be.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (be.len() - skip) as u8);
        out.extend_from_slice(&be[skip..]);
    }
}

/// Concatenate encoded parts into one buffer.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in parts {
        out.extend_from_slice(p);
    }
    out
}

/// Content octets of an OBJECT IDENTIFIER (no header).
pub fn oid_content(arcs: &[u32]) -> Vec<u8> {
    assert!(arcs.len() >= 2, "absolute OID needs at least two arcs");
    let mut out = Vec::new();
    push_base128(&mut out, arcs[0] * 40 + arcs[1]);
    for &arc in &arcs[2..] {
        push_base128(&mut out, arc);
    }
    out
}

fn push_base128(out: &mut Vec<u8>, mut v: u32) {
    let mut stack = [0u8; 5];
    let mut n = 0;
    loop {
        stack[n] = (v & 0x7F) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let cont = if i == 0 { 0 } else { 0x80 };
        out.push(stack[i] | cont);
    }
}

/// INTEGER TLV from an i64, minimally encoded.
pub fn int_tlv(value: i64) -> Vec<u8> {
    let be = value.to_be_bytes();
    let mut content: &[u8] = &be;
    while content.len() > 1
        && ((content[0] == 0x00 && content[1] & 0x80 == 0)
            || (content[0] == 0xFF && content[1] & 0x80 != 0))
    {
        content = &content[1..];
    }
    tlv(0x02, content)
}

#[test]
fn helpers_produce_expected_shapes() {
    assert_eq!(tlv(0x04, b"ab"), vec![0x04, 0x02, b'a', b'b']);
    assert_eq!(tlv(0x30, &[0u8; 200])[..3], [0x30, 0x81, 200]);
    assert_eq!(indefinite(0x30, &[0x05, 0x00]), vec![0x30, 0x80, 0x05, 0x00, 0x00, 0x00]);
    assert_eq!(
        oid_content(&[1, 2, 840, 113549]),
        vec![0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D]
    );
    assert_eq!(int_tlv(-1), vec![0x02, 0x01, 0xFF]);
    assert_eq!(int_tlv(128), vec![0x02, 0x02, 0x00, 0x80]);
}
