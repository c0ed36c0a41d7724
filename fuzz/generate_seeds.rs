#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn qoi(width: u32, height: u32, channels: u8, ops: &[u8]) -> Vec<u8> {
    let mut out = b"qoif".to_vec();
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.push(channels);
    out.push(1);
    out.extend_from_slice(ops);
    out.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // QOI 4x4 solid: literal + run
    fs::write(format!("{dir}/qoi_solid_4x4.qoi"), qoi(4, 4, 3, &[0xfe, 10, 20, 30, 0xce])).unwrap();

    // QOI RGBA 2x2 using every instruction kind
    let ops = [
        0xff, 1, 2, 3, 128, // rgba
        0x6a, // diff
        0xa2, 0x79, // luma
        34, // index (slot 34)
    ];
    fs::write(format!("{dir}/qoi_ops_2x2.qoi"), qoi(2, 2, 4, &ops)).unwrap();

    // QOI run longer than the image
    fs::write(format!("{dir}/qoi_overrun.qoi"), qoi(2, 1, 3, &[0xfd])).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), bmp).unwrap();

    // Top-down 32-bit BMP 1x1
    let mut bmp32 = vec![0u8; 58];
    bmp32[0] = b'B'; bmp32[1] = b'M';
    bmp32[2..6].copy_from_slice(&58u32.to_le_bytes());
    bmp32[10..14].copy_from_slice(&54u32.to_le_bytes());
    bmp32[14..18].copy_from_slice(&40u32.to_le_bytes());
    bmp32[18..22].copy_from_slice(&1i32.to_le_bytes());
    bmp32[22..26].copy_from_slice(&(-1i32).to_le_bytes());
    bmp32[26..28].copy_from_slice(&1u16.to_le_bytes());
    bmp32[28..30].copy_from_slice(&32u16.to_le_bytes());
    bmp32[54..58].copy_from_slice(&[0x10, 0x20, 0x30, 0x80]);
    fs::write(format!("{dir}/bmp32_topdown_1x1.bmp"), bmp32).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_magic.bin"), b"qoif").unwrap();
    fs::write(format!("{dir}/qoi_no_stream.bin"), &qoi(3, 3, 4, &[])[..14]).unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();

    println!("Generated seed corpus in {dir}/");
}
