// Unit tests for the image size adapter, using real encoded images.
//
// A deterministic pseudo-random pixel fill makes the PNG input large
// (noise defeats PNG's filters) so the shrink loop actually has work
// to do.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use plinth::media::adapter::shrink_to_fit;

/// Deterministic noise image encoded as PNG.
fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state = 0x2545F491u32;
    let img = RgbImage::from_fn(width, height, |_, _| {
        // xorshift — avoids pulling randomness into a deterministic test
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        image::Rgb([(state & 0xFF) as u8, (state >> 8 & 0xFF) as u8, (state >> 16 & 0xFF) as u8])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

#[test]
fn oversized_image_is_reduced_under_the_limit() {
    let original = noise_png(256, 256);
    let limit = 150_000;
    assert!(original.len() > limit, "noise PNG must start oversized");

    let adapted = shrink_to_fit(original, limit);
    assert!(adapted.len() <= limit);
    // The result must still be a decodable image
    image::load_from_memory(&adapted).unwrap();
}

#[test]
fn floor_reached_still_returns_best_effort_payload() {
    let original = noise_png(64, 64);
    // Impossible limit forces the loop to its quality floor
    let adapted = shrink_to_fit(original.clone(), 10);
    assert!(!adapted.is_empty());
    assert!(adapted.len() < original.len());
    image::load_from_memory(&adapted).unwrap();
}

#[test]
fn fitting_payload_is_returned_byte_identical() {
    let original = noise_png(32, 32);
    let adapted = shrink_to_fit(original.clone(), original.len());
    assert_eq!(adapted, original);
}
