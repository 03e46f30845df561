mod intake;

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub use intake::{intake_bytes, intake_path, mime_for_path};

/// Media type of every image the generation service hands back.
pub const RENDERED_MIME_TYPE: &str = "image/png";

/// Encoded payload as submitted to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub base64: String,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn png(base64: impl Into<String>) -> Self {
        Self::new(base64, RENDERED_MIME_TYPE)
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(BASE64.encode(bytes), mime_type)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.base64.as_bytes())
    }

    pub fn to_data_url(&self) -> String {
        data_url(&self.mime_type, &self.base64)
    }
}

/// An image held by the session.
///
/// `data` carries bytes and media type together. `preview_ref` is only for
/// display and is never sent to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAsset {
    pub source: Option<PathBuf>,
    pub preview_ref: Option<String>,
    pub data: Option<ImageData>,
}

impl ImageAsset {
    /// Asset for an image produced by the service.
    pub fn generated(data: ImageData) -> Self {
        Self {
            source: None,
            preview_ref: Some(data.to_data_url()),
            data: Some(data),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

pub fn data_url(mime_type: &str, base64: &str) -> String {
    format!("data:{mime_type};base64,{base64}")
}

pub fn parse_data_url(url: &str) -> Option<ImageData> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    if mime_type.is_empty() || payload.is_empty() {
        return None;
    }
    Some(ImageData::new(payload, mime_type))
}

#[cfg(test)]
mod tests {
    use super::{data_url, parse_data_url, ImageAsset, ImageData};

    #[test]
    fn data_url_parses_back_into_payload() {
        let url = data_url("image/png", "aGVsbG8=");
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
        assert_eq!(
            parse_data_url(&url),
            Some(ImageData::new("aGVsbG8=", "image/png"))
        );
    }

    #[test]
    fn parse_data_url_rejects_non_base64_urls() {
        assert_eq!(parse_data_url("https://example.com/a.png"), None);
        assert_eq!(parse_data_url("data:image/png,raw"), None);
        assert_eq!(parse_data_url("data:;base64,abc"), None);
        assert_eq!(parse_data_url("data:image/png;base64,"), None);
    }

    #[test]
    fn generated_asset_previews_as_data_url() {
        let asset = ImageAsset::generated(ImageData::png("AAAA"));
        assert!(asset.is_loaded());
        assert_eq!(
            asset.preview_ref.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert!(asset.source.is_none());
    }
}
