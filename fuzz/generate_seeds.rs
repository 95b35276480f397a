#!/usr/bin/env -S cargo +nightly -Zscript
---
[dependencies]
zenpng = { path = ".." }
---
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

use zenpng::{Chunk, ChunkType, PixelBuffer, SIGNATURE, Unstoppable};

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // RGBW 2x2
    let rgbw = PixelBuffer::from_rgb8(
        2,
        2,
        &[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
    )
    .unwrap();
    let png = zenpng::encode_to_vec(&rgbw, Unstoppable).unwrap();
    fs::write(format!("{dir}/rgbw_2x2.png"), &png).unwrap();

    // Gradient 7x5, stored (level 0)
    let gradient: Vec<u8> = (0..7 * 5 * 3).map(|i| (i * 7) as u8).collect();
    let image = PixelBuffer::from_rgb8(7, 5, &gradient).unwrap();
    let stored = zenpng::EncodeRequest::new()
        .with_compression_level(0)
        .encode_to_vec(&image, Unstoppable)
        .unwrap();
    fs::write(format!("{dir}/gradient_7x5_stored.png"), &stored).unwrap();

    // Header-only stream with an interlaced RGBA IHDR
    let mut header_only = SIGNATURE.to_vec();
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&4u32.to_be_bytes());
    ihdr.extend_from_slice(&4u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 1]);
    Chunk::new(ChunkType::IHDR, ihdr)
        .write_to(&mut header_only)
        .unwrap();
    Chunk::new(ChunkType::IEND, Vec::new())
        .write_to(&mut header_only)
        .unwrap();
    fs::write(format!("{dir}/rgba_interlaced_header.png"), header_only).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/signature_only.bin"), SIGNATURE).unwrap();
    fs::write(format!("{dir}/cut_in_idat.bin"), &png[..png.len() - 20]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
