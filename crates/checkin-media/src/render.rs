//! PNG QR rendering.

use std::path::Path;

use checkin_core::media::QrRenderer;
use image::Luma;
use qrcode::{EcLevel, QrCode};

use crate::Error;

/// Renders at medium error correction, never smaller than `min_size` pixels
/// per side.
#[derive(Debug, Clone)]
pub struct PngQrRenderer {
  min_size: u32,
}

impl PngQrRenderer {
  pub fn new(min_size: u32) -> Self { Self { min_size } }
}

impl Default for PngQrRenderer {
  fn default() -> Self { Self::new(256) }
}

impl QrRenderer for PngQrRenderer {
  type Error = Error;

  fn render(&self, content: &str, dest: &Path) -> Result<(), Error> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::M)?;
    code
      .render::<Luma<u8>>()
      .min_dimensions(self.min_size, self.min_size)
      .build()
      .save(dest)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_a_png_of_at_least_the_minimum_size() {
    let dest = std::env::temp_dir().join(format!("checkin-render-{}.png", std::process::id()));
    PngQrRenderer::default()
      .render("https://front.example.com/checkin?token=00ff", &dest)
      .unwrap();

    let img = image::open(&dest).unwrap();
    assert!(img.width() >= 256);
    assert_eq!(img.width(), img.height());
    std::fs::remove_file(&dest).unwrap();
  }

  #[test]
  fn unwritable_destination_is_an_error() {
    let dest = std::env::temp_dir().join("checkin-no-such-dir").join("x").join("qr.png");
    assert!(PngQrRenderer::default().render("hello", &dest).is_err());
  }
}
