#![no_main]

use libfuzzer_sys::fuzz_target;

use ber_dissect::Oid;

fuzz_target!(|data: &[u8]| {
    // Fuzz the BER content parsers
    let _ = Oid::from_ber(data, 0);
    let _ = Oid::from_ber_relative(data, 0);

    // Fuzz the dotted-text parser
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(oid) = text.parse::<Oid>() {
            // A parsed OID must re-render to a parseable form.
            let rendered = oid.to_string();
            let _ = rendered.parse::<Oid>().unwrap();
        }
    }
});
