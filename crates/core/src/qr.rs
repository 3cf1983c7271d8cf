//! QR code rendering for published experiences.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::QrCode;

/// Minimum rendered edge length in pixels.
const MIN_QR_DIMENSION: u32 = 290;

/// Error type for QR rendering.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode `data` as a QR code and return it as PNG bytes.
pub fn render_png(data: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_QR_DIMENSION, MIN_QR_DIMENSION)
        .build();

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
