#![no_main]
use libfuzzer_sys::fuzz_target;
use zenpng::*;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to the same samples
    let limits = Limits::default().with_max_pixels(1 << 20);
    let Ok(decoded) = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(Unstoppable)
    else {
        return;
    };

    let header = probe(data).expect("decodable stream must probe");
    assert_eq!((header.width, header.height), (decoded.width(), decoded.height()));

    let reencoded = encode_to_vec(&decoded, Unstoppable).expect("re-encode failed");
    let Ok(decoded2) = decode(&reencoded[..], Unstoppable) else {
        panic!("re-encoded data failed to decode");
    };
    assert_eq!(decoded, decoded2, "roundtrip pixel mismatch");
});
