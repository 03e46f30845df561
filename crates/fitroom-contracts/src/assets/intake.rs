use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageFormat;

use super::{ImageAsset, ImageData};

/// Declared media type for a file, derived from its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Builds an asset from raw bytes when the declared type is an image type.
///
/// Anything else yields `None` so the caller leaves its state untouched.
pub fn intake_bytes(
    source: Option<PathBuf>,
    declared_type: &str,
    bytes: &[u8],
) -> Option<ImageAsset> {
    let declared_type = declared_type.trim();
    if !declared_type.starts_with("image/") {
        return None;
    }
    let preview_ref = source.as_deref().map(file_url);
    Some(ImageAsset {
        source,
        preview_ref,
        data: Some(ImageData::from_bytes(bytes, declared_type)),
    })
}

pub fn intake_path(path: &Path) -> Result<Option<ImageAsset>> {
    let Some(declared_type) = mime_for_path(path) else {
        tracing::debug!(path = %path.display(), "ignoring non-image file");
        return Ok(None);
    };
    let bytes = std::fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let source = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Ok(intake_bytes(Some(source), declared_type, &bytes))
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
