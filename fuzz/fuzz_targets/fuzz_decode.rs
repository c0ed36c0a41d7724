#![no_main]
use libfuzzer_sys::fuzz_target;
use zenconvert::Limits;

fuzz_target!(|data: &[u8]| {
    // Keep allocations small so the fuzzer explores parsing, not the allocator.
    let limits = Limits::none().with_max_pixels(1 << 20);

    // Each decoder and the header probe must never panic
    let _ = zenconvert::decode_qoi(data, &limits);
    let _ = zenconvert::decode_bmp(data, &limits);
    let _ = zenconvert::ImageInfo::from_bytes(data);
});
