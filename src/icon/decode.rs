//! Header-only image decoding
//!
//! Selection only needs an icon's dimensions, so each decoder stops after the
//! image header and never touches pixel data.

use image::codecs::bmp::BmpDecoder;
use image::codecs::gif::GifDecoder;
use image::codecs::ico::IcoDecoder;
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{ImageDecoder, ImageFormat, ImageResult};
use std::io::Cursor;

/// Reads the dimensions of one image format from its header
pub trait HeaderDecoder: Send + Sync {
    /// MIME type reported for icons of this format
    fn mime(&self) -> &'static str;

    /// Decodes `(width, height)` from the image header
    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)>;
}

struct PngHeader;
struct JpegHeader;
struct GifHeader;
struct BmpHeader;
struct WebpHeader;
struct IcoHeader;

impl HeaderDecoder for PngHeader {
    fn mime(&self) -> &'static str {
        "image/png"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(PngDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

impl HeaderDecoder for JpegHeader {
    fn mime(&self) -> &'static str {
        "image/jpeg"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(JpegDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

impl HeaderDecoder for GifHeader {
    fn mime(&self) -> &'static str {
        "image/gif"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(GifDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

impl HeaderDecoder for BmpHeader {
    fn mime(&self) -> &'static str {
        "image/bmp"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(BmpDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

impl HeaderDecoder for WebpHeader {
    fn mime(&self) -> &'static str {
        "image/webp"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(WebPDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

// The ICO decoder reports the largest entry in the icon directory.
impl HeaderDecoder for IcoHeader {
    fn mime(&self) -> &'static str {
        "image/x-icon"
    }

    fn dimensions(&self, bytes: &[u8]) -> ImageResult<(u32, u32)> {
        Ok(IcoDecoder::new(Cursor::new(bytes))?.dimensions())
    }
}

/// Returns the header decoder for a sniffed format, if icons of that format
/// are supported
pub fn decoder_for(format: ImageFormat) -> Option<&'static dyn HeaderDecoder> {
    match format {
        ImageFormat::Png => Some(&PngHeader),
        ImageFormat::Jpeg => Some(&JpegHeader),
        ImageFormat::Gif => Some(&GifHeader),
        ImageFormat::Bmp => Some(&BmpHeader),
        ImageFormat::WebP => Some(&WebpHeader),
        ImageFormat::Ico => Some(&IcoHeader),
        _ => None,
    }
}
