//! Icon model, content sniffing and selection
//!
//! - `sniff`: classifies fetched bytes as SVG, a sized bitmap, or not an image
//! - `decode`: per-format header decoders that read dimensions only
//! - `select`: picks the best icon from a candidate set

mod decode;
mod select;
mod sniff;

pub use decode::{decoder_for, HeaderDecoder};
pub use select::select;
pub use sniff::{classify, Classification, ImageMeta, SVG_MIME};

#[cfg(test)]
pub(crate) use sniff::test_images;

use bytes::Bytes;

/// An icon that was fetched and successfully classified
///
/// Width and height are `None` for SVG icons, which are resolution
/// independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// URL the icon was requested from
    pub url: String,

    /// MIME type, e.g. `image/png`
    pub mime: String,

    /// Width in pixels (absent for SVG)
    pub width: Option<u32>,

    /// Height in pixels (absent for SVG)
    pub height: Option<u32>,

    /// Icon bytes as downloaded
    pub source: Bytes,
}

impl Icon {
    /// Builds an icon from a classification, if the classification is an icon
    pub fn from_classification(
        url: impl Into<String>,
        classification: Classification,
        source: Bytes,
    ) -> Option<Self> {
        let url = url.into();
        match classification {
            Classification::Svg => Some(Self {
                url,
                mime: SVG_MIME.to_string(),
                width: None,
                height: None,
                source,
            }),
            Classification::Image(meta) => Some(Self {
                url,
                mime: meta.mime.to_string(),
                width: Some(meta.width),
                height: Some(meta.height),
                source,
            }),
            Classification::NotAnImage | Classification::DecodeError(_) => None,
        }
    }

    /// Returns true for resolution-independent SVG icons
    pub fn is_svg(&self) -> bool {
        self.mime == SVG_MIME
    }

    /// Returns true if width equals height
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            "image/x-icon" => "ico",
            SVG_MIME => "svg",
            _ => "bin",
        }
    }
}
