//! Content sniffing for fetched candidates
//!
//! Classification order:
//! 1. A URL ending in `.svg` is an SVG; the bytes are not inspected
//! 2. The format is sniffed from the byte prefix; anything that is not a
//!    supported bitmap format is not an image
//! 3. The image header is decoded for width and height

use crate::icon::decode::decoder_for;
use crate::url::is_svg_url;

/// MIME type reported for SVG icons
pub const SVG_MIME: &str = "image/svg+xml";

/// Dimensions and type of a decoded image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
}

/// Outcome of classifying one fetched candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Resolution-independent SVG, identified by URL
    Svg,

    /// Bitmap with a readable header
    Image(ImageMeta),

    /// Content is not a supported image; expected for guessed URLs
    NotAnImage,

    /// Recognized image format whose header could not be decoded
    DecodeError(String),
}

/// Classifies the bytes fetched from `url`
///
/// # Examples
///
/// ```
/// use icon_scraper::icon::{classify, Classification};
///
/// let html = b"<!doctype html><html></html>";
/// assert_eq!(classify("https://example.com/favicon.ico", html), Classification::NotAnImage);
/// assert_eq!(classify("https://example.com/logo.svg", html), Classification::Svg);
/// ```
pub fn classify(url: &str, bytes: &[u8]) -> Classification {
    if is_svg_url(url) {
        return Classification::Svg;
    }

    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(_) => return Classification::NotAnImage,
    };

    let decoder = match decoder_for(format) {
        Some(decoder) => decoder,
        None => return Classification::NotAnImage,
    };

    match decoder.dimensions(bytes) {
        Ok((width, height)) => Classification::Image(ImageMeta {
            width,
            height,
            mime: decoder.mime(),
        }),
        Err(e) => Classification::DecodeError(e.to_string()),
    }
}
