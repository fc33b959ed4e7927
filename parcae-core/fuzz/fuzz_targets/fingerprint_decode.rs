#![no_main]
use libfuzzer_sys::fuzz_target;
use parcae_core::fingerprint::{codec, Fingerprint};

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(fp) = Fingerprint::decode(token) {
        // Anything that decodes must re-encode to a token that decodes to
        // the same values.
        let again = codec::decode_token(&fp.token()).expect("re-encoded token must decode");
        assert_eq!(again, fp.quantized());
    }
});
