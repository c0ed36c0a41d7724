#![no_main]
use libfuzzer_sys::fuzz_target;
use zenconvert::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::none().with_max_pixels(1 << 20);

    // If we can decode it, re-encoding and decoding again must produce identical pixels
    if let Ok(decoded) = decode_qoi(data, &limits) {
        let reencoded = encode_qoi(&decoded).expect("decoded image must re-encode");
        let Ok(decoded2) = decode_qoi(&reencoded, &limits) else {
            panic!("re-encoded QOI failed to decode");
        };
        assert_eq!(decoded, decoded2, "QOI roundtrip mismatch");
    }

    if let Ok(decoded) = decode_bmp(data, &limits) {
        let Ok(reencoded) = encode_bmp(&decoded) else { return };
        let Ok(decoded2) = decode_bmp(&reencoded, &limits) else {
            panic!("re-encoded BMP failed to decode");
        };
        // 24-bit output drops alpha
        assert_eq!(decoded.width(), decoded2.width());
        assert_eq!(decoded.height(), decoded2.height());
        if decoded.layout() == PixelLayout::Rgb8 {
            assert_eq!(decoded.pixels(), decoded2.pixels(), "BMP roundtrip mismatch");
        }
    }
});
