use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder};

/// Edge length of the square image sent to the provider.
pub const TARGET_SIZE: u32 = 544;
const JPEG_QUALITY: u8 = 90;

/// Resize an uploaded photo to a `TARGET_SIZE` square JPEG.
///
/// Uses a cover fit (scale to fill, then center-crop). Any decode or encode
/// failure returns the input untouched: the provider accepts other sizes,
/// so the request goes ahead with the original bytes.
pub fn prepare_image(input: &[u8]) -> Vec<u8> {
    match cover_to_jpeg(input, TARGET_SIZE) {
        Ok(encoded) => {
            log::debug!(
                "🖼️ Image preprocessed: {} bytes -> {} bytes ({}x{} JPEG)",
                input.len(),
                encoded.len(),
                TARGET_SIZE,
                TARGET_SIZE
            );
            encoded
        }
        Err(e) => {
            log::warn!("⚠️ Image preprocessing failed, sending original bytes: {}", e);
            input.to_vec()
        }
    }
}

fn cover_to_jpeg(input: &[u8], size: u32) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(input)?;
    let filled = decoded.resize_to_fill(size, size, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(filled.to_rgb8());

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder.write_image(
        rgb.as_bytes(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(buffer)
}

/// Runs `prepare_image` on the blocking pool so decoding doesn't stall the
/// async workers.
pub async fn prepare_image_blocking(input: Vec<u8>) -> Vec<u8> {
    let fallback = input.clone();
    match tokio::task::spawn_blocking(move || prepare_image(&input)).await {
        Ok(encoded) => encoded,
        Err(e) => {
            log::warn!("⚠️ Image preprocessing task failed, sending original bytes: {}", e);
            fallback
        }
    }
}
