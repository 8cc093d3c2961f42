use crate::error::{CoraError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{imageops, DynamicImage, ImageBuffer, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Renders Pix "copia e cola" (EMV) payloads as PNG QR codes.
///
/// The output image is a square of `size + 2 * margin` pixels. Modules are
/// rounded down to a whole number of pixels and the leftover space is added
/// to the margin.
#[derive(Debug, Clone, Copy)]
pub struct PixQrCode {
    pub default_size: u32,
    pub default_margin: u32,
}

impl Default for PixQrCode {
    fn default() -> Self {
        PixQrCode {
            default_size: 700,
            default_margin: 5,
        }
    }
}

impl PixQrCode {
    pub fn new(default_size: u32, default_margin: u32) -> Self {
        PixQrCode {
            default_size,
            default_margin,
        }
    }

    /// Render the EMV payload as PNG bytes
    pub fn png_from_emv(&self, emv: &str, size: Option<u32>, margin: Option<u32>) -> Result<Vec<u8>> {
        let size = size.unwrap_or(self.default_size);
        let margin = margin.unwrap_or(self.default_margin);

        let code = QrCode::new(emv.as_bytes()).map_err(|e| CoraError::QrCode(e.to_string()))?;
        let modules = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .max_dimensions(size, size)
            .build();

        // Tiny sizes can't fit one pixel per module, grow the canvas instead
        let inner = size.max(modules.width());
        let side = inner + 2 * margin;
        let mut canvas = ImageBuffer::from_pixel(side, side, Luma([255u8]));
        let offset = i64::from((side - modules.width()) / 2);
        imageops::overlay(&mut canvas, &modules, offset, offset);

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(canvas)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| CoraError::QrCode(e.to_string()))?;
        Ok(png)
    }

    /// Render the EMV payload as a `data:image/png;base64,...` URI
    pub fn data_uri_from_emv(&self, emv: &str, size: Option<u32>, margin: Option<u32>) -> Result<String> {
        let png = self.png_from_emv(emv, size, margin)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}
