use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::error::{FacelensError, Result};

/// Decode a staged image file.
///
/// The format is sniffed from the content, not the extension. A file that
/// cannot be decoded is an error, never an empty OCR result.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| FacelensError::ImageDecode(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| FacelensError::ImageDecode(format!("{}: {e}", path.display())))?;

    reader
        .decode()
        .map_err(|e| FacelensError::ImageDecode(format!("{}: {e}", path.display())))
}

/// Resize factors applied to each axis of an image before OCR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    pub const UNIT: Self = Self { x: 1.0, y: 1.0 };
}

/// Prepare a decoded image for the OCR engine.
///
/// Applies the following transformations:
/// 1. Resizes images larger than `max_dim` while maintaining aspect ratio
/// 2. Converts to grayscale
/// 3. Stretches contrast
///
/// # Returns
/// PNG bytes plus the per-axis scale applied (`1.0` when not resized), so
/// that box coordinates can be mapped back onto the original image.
pub fn prepare_for_ocr(img: &DynamicImage, max_dim: u32) -> Result<(Vec<u8>, ScaleFactors)> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(FacelensError::ImageDecode("Image has no pixels".to_string()));
    }

    let resized = resize_if_needed(img.clone(), max_dim);
    let scale = ScaleFactors {
        x: resized.width() as f32 / width as f32,
        y: resized.height() as f32 / height as f32,
    };

    let gray = enhance_grayscale_contrast(resized.to_luma8());
    let output = encode_png(&DynamicImage::ImageLuma8(gray))?;

    Ok((output, scale))
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| FacelensError::Ocr(format!("Failed to encode image: {e}")))?;
    Ok(output)
}

/// Resize image if it exceeds maximum dimension while maintaining aspect ratio
///
/// Uses Lanczos3 filter for high-quality downscaling
fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

/// Enhance contrast on a grayscale image using histogram stretching
///
/// Maps the darkest pixel to 0 and the lightest to 255,
/// scaling all intermediate values linearly
fn enhance_grayscale_contrast(gray: image::GrayImage) -> image::GrayImage {
    let mut min_val = 255u8;
    let mut max_val = 0u8;

    for pixel in gray.pixels() {
        let val = pixel[0];
        min_val = min_val.min(val);
        max_val = max_val.max(val);
    }

    // Flat image, nothing to stretch
    if max_val <= min_val {
        return gray;
    }

    let range = (max_val - min_val) as f32;
    image::GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y);
        let normalized = (pixel[0] - min_val) as f32 / range;
        image::Luma([(normalized * 255.0) as u8])
    })
}
