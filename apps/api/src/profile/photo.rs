use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat};

use crate::errors::AppError;

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// Photos are downscaled to fit inside a square of this size.
pub const MAX_DIMENSION: u32 = 400;

#[derive(Debug)]
pub struct ProcessedPhoto {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub content_type: &'static str,
}

/// Sniffs the format from the bytes. JPEG and PNG are downscaled (never
/// upscaled) and re-encoded in their own format; GIF passes through untouched
/// so animations survive.
pub fn process_photo(bytes: &[u8]) -> Result<ProcessedPhoto, AppError> {
    let format = image::guess_format(bytes).map_err(|_| unsupported())?;
    let (extension, content_type) = match format {
        ImageFormat::Jpeg => ("jpg", "image/jpeg"),
        ImageFormat::Png => ("png", "image/png"),
        ImageFormat::Gif => {
            return Ok(ProcessedPhoto {
                bytes: bytes.to_vec(),
                extension: "gif",
                content_type: "image/gif",
            })
        }
        _ => return Err(unsupported()),
    };

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AppError::Validation(format!("could not decode image: {e}")))?;
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("image encoding failed: {e}")))?;

    Ok(ProcessedPhoto {
        bytes: out,
        extension,
        content_type,
    })
}

fn unsupported() -> AppError {
    AppError::Validation("photo must be a JPEG, PNG or GIF image".to_string())
}
