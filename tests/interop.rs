//! Cross-checks against the `png` crate, in both directions.

mod common;

use std::io::Read;

use common::*;
use enough::Unstoppable;
use zenpng::*;

fn reference_encode(
    pixels: &[u8],
    w: u32,
    h: u32,
    color: png::ColorType,
    filter: png::FilterType,
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, w, h);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_filter(filter);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(pixels).unwrap();
    }
    out
}

fn reference_decode(data: &[u8]) -> (png::OutputInfo, Vec<u8>) {
    let decoder = png::Decoder::new(data);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info, buf)
}

#[test]
fn reference_decoder_reads_our_output() {
    for (w, h) in [(1, 1), (2, 2), (19, 7), (64, 33)] {
        let pixels = noise_pattern(w as usize, h as usize);
        let image = PixelBuffer::from_rgb8(w, h, &pixels).unwrap();
        let ours = encode_to_vec(&image, Unstoppable).unwrap();

        let (info, decoded) = reference_decode(&ours);
        assert_eq!((info.width, info.height), (w, h));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(info.bit_depth, png::BitDepth::Eight);
        assert_eq!(decoded, pixels);
    }
}

#[test]
fn we_read_unfiltered_reference_output() {
    for (w, h) in [(1, 1), (3, 2), (40, 25)] {
        let pixels = gradient(w as usize, h as usize);
        let theirs = reference_encode(
            &pixels,
            w,
            h,
            png::ColorType::Rgb,
            png::FilterType::NoFilter,
        );

        let header = probe(&theirs[..]).unwrap();
        assert_eq!((header.width, header.height, header.bit_depth), (w, h, 8));
        let decoded = decode(&theirs[..], Unstoppable).unwrap();
        assert_eq!(decoded, PixelBuffer::from_rgb8(w, h, &pixels).unwrap());
    }
}

/// Filter byte of every scanline in a truecolor stream.
fn row_filters(data: &[u8], width: usize) -> Vec<u8> {
    let chunks = DecodeRequest::new(data).read_chunks().unwrap();
    let compressed: Vec<u8> = chunks
        .of_type(ChunkType::IDAT)
        .flat_map(|c| c.data().iter().copied())
        .collect();
    let mut raw = Vec::new();
    flate2::read::ZlibDecoder::new(&compressed[..])
        .read_to_end(&mut raw)
        .unwrap();
    raw.chunks_exact(width * 3 + 1).map(|row| row[0]).collect()
}

#[test]
fn filtered_reference_output_is_unsupported() {
    let pixels = gradient(64, 64);
    for filter in [png::FilterType::Sub, png::FilterType::Up, png::FilterType::Paeth] {
        let theirs = reference_encode(&pixels, 64, 64, png::ColorType::Rgb, filter);
        let filters = row_filters(&theirs, 64);
        assert_eq!(filters.len(), 64);
        assert!(
            filters.iter().any(|&f| f != 0),
            "{filter:?}: fixture is unfiltered"
        );

        let err = decode(&theirs[..], Unstoppable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported, "{filter:?}: {err}");
    }
}

#[test]
fn reference_rgba_is_unsupported() {
    let rgba = vec![128u8; 4 * 4 * 4];
    let theirs = reference_encode(&rgba, 4, 4, png::ColorType::Rgba, png::FilterType::NoFilter);
    // The probe still reports the header.
    assert_eq!(probe(&theirs[..]).unwrap().width, 4);
    assert!(matches!(
        decode(&theirs[..], Unstoppable),
        Err(PngError::Unsupported(_))
    ));
}

#[test]
fn reference_decoder_reads_split_idat() {
    let pixels = noise_pattern(12, 10);
    let split = rgb_png(12, 10, &pixels, 3);
    let (_, decoded) = reference_decode(&split);
    assert_eq!(decoded, pixels);
}
