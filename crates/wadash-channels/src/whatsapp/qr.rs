//! QR code rendering for pairing challenges.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use wadash_core::error::WadashError;

/// Render `qr_data` as PNG image bytes.
pub fn generate_qr_image(qr_data: &str) -> Result<Vec<u8>, WadashError> {
    use image::{ImageBuffer, Luma};
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| WadashError::Qr(format!("QR generation failed: {e}")))?;

    let module_size: u32 = 8;
    let quiet_zone: u32 = 4;
    let modules = code.width() as u32;
    let img_size = (modules + quiet_zone * 2) * module_size;

    let img = ImageBuffer::from_fn(img_size, img_size, |x, y| {
        let (cx, cy) = (x / module_size, y / module_size);
        if cx < quiet_zone || cy < quiet_zone {
            return Luma([255u8]);
        }
        let (mx, my) = (cx - quiet_zone, cy - quiet_zone);
        if mx >= modules || my >= modules {
            return Luma([255u8]);
        }
        match code[(mx as usize, my as usize)] {
            Color::Dark => Luma([0u8]),
            Color::Light => Luma([255u8]),
        }
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| WadashError::Qr(format!("PNG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}

/// Render `qr_data` as a `data:image/png;base64,...` URI for an `<img>` tag.
pub fn qr_data_url(qr_data: &str) -> Result<String, WadashError> {
    let png = generate_qr_image(qr_data)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
