#![no_main]
use libfuzzer_sys::fuzz_target;
use zenpng::{DecodeRequest, Limits};

fuzz_target!(|data: &[u8]| {
    // Must never panic
    let _ = zenpng::probe(data);
    let _ = DecodeRequest::new(data).read_chunks();

    // Keep allocations bounded for hostile headers
    let limits = Limits::default()
        .with_max_pixels(1 << 22)
        .with_max_memory_bytes(1 << 28);
    let _ = DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable);
});
