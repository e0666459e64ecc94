use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::discovery::format::PageFormat;
use crate::foundation::core::Size;
use crate::foundation::error::{GalleryError, GalleryResult};

/// Decoded page image, ready to mount without a second fetch.
#[derive(Clone, Debug)]
pub struct DecodedPage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 pixels.
    pub pixels: Arc<image::RgbaImage>,
}

impl DecodedPage {
    /// Intrinsic image size.
    pub fn natural_size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Decode capability. A failure means the runtime cannot render this payload.
pub trait PageDecoder {
    fn decode(&self, bytes: &[u8], format: PageFormat) -> GalleryResult<DecodedPage>;
}

/// Decoder backed by the `image` crate.
///
/// The payload's own signature decides the codec; the requested format is only a fallback hint
/// for payloads without a recognizable signature. Encodings whose codec is not compiled in fail
/// to decode and count as absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateDecoder;

impl PageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8], format: PageFormat) -> GalleryResult<DecodedPage> {
        decode_page(bytes, format).map_err(|e| GalleryError::decode(format!("{e:#}")))
    }
}

fn decode_page(bytes: &[u8], format: PageFormat) -> anyhow::Result<DecodedPage> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("sniff image format")?;
    if reader.format().is_none() {
        reader.set_format(format.image_format());
    }
    let img = reader
        .decode()
        .with_context(|| format!("decode {format} payload"))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("decoded {format} payload has zero size");
    }
    Ok(DecodedPage {
        width,
        height,
        pixels: Arc::new(rgba),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/discovery/decode.rs"]
mod tests;
