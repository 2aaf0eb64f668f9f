use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, imageops::FilterType};

use crate::utils::error::CustomError;

#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub ext: String,
    pub max_size: u32,
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions {
            ext: "jpg".to_string(),
            max_size: 1200,
            quality: 95,
        }
    }
}

impl CompressOptions {
    pub fn for_extension(ext: &str) -> Self {
        CompressOptions {
            ext: ext.to_lowercase(),
            ..Default::default()
        }
    }
}

fn target_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let largest = width.max(height);
    if largest <= max_size {
        return (width, height);
    }
    let scale = max_size as f64 / largest as f64;
    (
        ((width as f64 * scale) as u32).max(1),
        ((height as f64 * scale) as u32).max(1),
    )
}

/// Decodes, fits the image into a `max_size` bounding box preserving
/// aspect ratio (never upscaling) and re-encodes. JPEG output drops the
/// alpha channel.
pub fn compress_image(bytes: &[u8], options: &CompressOptions) -> Result<Vec<u8>, CustomError> {
    let format = match options.ext.as_str() {
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "png" => ImageFormat::Png,
        _ => return Err(CustomError::BadRequestError("Extension not allowed".to_string())),
    };

    let decoded = image::load_from_memory(bytes)
        .map_err(|_| CustomError::BadRequestError("Invalid image data".to_string()))?;

    let (width, height) = target_dimensions(decoded.width(), decoded.height(), options.max_size);
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let rgb = resized.to_rgb8();
            JpegEncoder::new_with_quality(&mut out, options.quality)
                .encode_image(&rgb)
                .map_err(|e| {
                    CustomError::InternalServerError(format!("Failed to encode image: {}", e))
                })?;
        }
        _ => {
            resized.write_to(&mut out, format).map_err(|e| {
                CustomError::InternalServerError(format!("Failed to encode image: {}", e))
            })?;
        }
    }

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([120, 30, 200, 255]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = compress_image(&png_fixture(4, 4), &CompressOptions::for_extension("gif"));
        assert!(matches!(err, Err(CustomError::BadRequestError(_))));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = compress_image(b"not an image", &CompressOptions::default());
        assert!(matches!(err, Err(CustomError::BadRequestError(_))));
    }

    #[test]
    fn jpeg_output_is_decodable_rgb() {
        let out = compress_image(&png_fixture(8, 8), &CompressOptions::default()).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn resizes_into_bounding_box() {
        let opts = CompressOptions {
            max_size: 10,
            ..CompressOptions::for_extension("png")
        };
        let out = compress_image(&png_fixture(40, 20), &opts).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 5));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(target_dimensions(100, 60, 1200), (100, 60));
        assert_eq!(target_dimensions(2400, 1200, 1200), (1200, 600));
        assert_eq!(target_dimensions(1, 3000, 1200), (1, 1200));
    }
}
