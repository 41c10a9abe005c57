// Shrink-to-fit for image attachments.
//
// Bluesky rejects blobs over a fixed byte ceiling. Oversized images go
// through a bounded refinement loop: first a compression-only JPEG
// re-encode, then stepwise quality reduction combined with downscaling.
// Each downscale is computed from the ORIGINAL image's dimensions, not
// the previous attempt's output, so artifacts don't compound. The loop
// is best-effort — if the quality floor is reached while still over the
// limit, the last attempt is returned and the caller decides what to do.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::{debug, warn};

/// Bluesky's blob size ceiling for image uploads, in bytes.
pub const MAX_ATTACHMENT_BYTES: usize = 1_000_000;

const START_QUALITY: u8 = 80;
const QUALITY_STEP: u8 = 10;
const MIN_QUALITY: u8 = 40;
/// Width reduction per step, as a fraction of the original width.
const SCALE_STEP: f32 = 0.15;
const MIN_SCALE: f32 = 0.25;

/// Re-encode an oversized image until it fits under `limit`.
///
/// Payloads already under the limit are returned unchanged, as are
/// payloads that fail to decode (non-image bytes pass through — the
/// caller gates on MIME type, this is just a second line of defense).
pub fn shrink_to_fit(bytes: Vec<u8>, limit: usize) -> Vec<u8> {
    if bytes.len() <= limit {
        return bytes;
    }

    let original = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "Oversized payload is not a decodable image, leaving as-is");
            return bytes;
        }
    };

    let mut last = bytes;
    for (quality, scale) in attempt_plan() {
        let attempt = match encode_attempt(&original, quality, scale) {
            Ok(out) => out,
            Err(e) => {
                warn!(quality = quality, error = %e, "JPEG re-encode failed");
                continue;
            }
        };

        debug!(
            quality = quality,
            scale = scale,
            size = attempt.len(),
            "Shrink attempt"
        );

        let fits = attempt.len() <= limit;
        last = attempt;
        if fits {
            return last;
        }
    }

    warn!(
        size = last.len(),
        limit = limit,
        "Quality floor reached, payload still over limit"
    );
    last
}

/// The bounded (quality, scale) schedule: one compression-only attempt,
/// then simultaneous quality and width reduction down to the floors.
fn attempt_plan() -> Vec<(u8, f32)> {
    let mut plan = vec![(START_QUALITY, 1.0)];
    let mut quality = START_QUALITY;
    let mut scale = 1.0f32;
    while quality > MIN_QUALITY {
        quality -= QUALITY_STEP;
        scale = (scale - SCALE_STEP).max(MIN_SCALE);
        plan.push((quality, scale));
    }
    plan
}

fn encode_attempt(
    original: &DynamicImage,
    quality: u8,
    scale: f32,
) -> image::ImageResult<Vec<u8>> {
    let img = if scale < 1.0 {
        let w = ((original.width() as f32 * scale) as u32).max(1);
        let h = ((original.height() as f32 * scale) as u32).max(1);
        original.resize(w, h, FilterType::Lanczos3)
    } else {
        original.clone()
    };

    // JPEG has no alpha channel — flatten to RGB before encoding.
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
    Ok(out)
}
