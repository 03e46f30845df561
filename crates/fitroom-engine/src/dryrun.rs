use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};

use fitroom_contracts::assets::ImageData;
use fitroom_contracts::catalog::{BACKGROUND_CATALOG, POSE_CATALOG};
use fitroom_contracts::errors::GenerationError;
use fitroom_contracts::studio::GenerationRequest;

use crate::prompts::{try_on_prompt, DESCRIBE_POSE_PROMPT, RENDER_PRODUCT_PROMPT};
use crate::service::TryOnService;

const DRYRUN_WIDTH: u32 = 64;
const DRYRUN_HEIGHT: u32 = 96;

/// Offline service. Same inputs give the same PNG bytes and the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryrunService;

impl TryOnService for DryrunService {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn render_product(&self, product: &ImageData) -> Result<String, GenerationError> {
        let digest = digest_of(&[RENDER_PRODUCT_PROMPT.as_bytes(), product.base64.as_bytes()]);
        encode_swatch(&digest)
    }

    fn describe_pose(&self, image: &ImageData) -> Result<String, GenerationError> {
        let digest = digest_of(&[DESCRIBE_POSE_PROMPT.as_bytes(), image.base64.as_bytes()]);
        let entry = &POSE_CATALOG[digest[0] as usize % POSE_CATALOG.len()];
        Ok(entry.description.to_string())
    }

    fn creative_pose(&self, rendered: &ImageData) -> Result<String, GenerationError> {
        let digest = digest_of(&[b"pose", rendered.base64.as_bytes()]);
        let entry = &POSE_CATALOG[digest[0] as usize % POSE_CATALOG.len()];
        Ok(entry.description.to_string())
    }

    fn creative_background(&self, rendered: &ImageData) -> Result<String, GenerationError> {
        let digest = digest_of(&[b"background", rendered.base64.as_bytes()]);
        let entry = &BACKGROUND_CATALOG[digest[0] as usize % BACKGROUND_CATALOG.len()];
        Ok(entry.description.to_string())
    }

    fn generate_try_on(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = try_on_prompt(request);
        let mut chunks: Vec<&[u8]> = vec![prompt.text.as_bytes()];
        chunks.extend(prompt.images.iter().map(|image| image.base64.as_bytes()));
        encode_swatch(&digest_of(&chunks))
    }
}

fn digest_of(chunks: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update((chunk.len() as u64).to_be_bytes());
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

// Top half takes the first color of the digest, bottom half the second.
fn encode_swatch(digest: &[u8; 32]) -> Result<String, GenerationError> {
    let top = Rgb([digest[0], digest[1], digest[2]]);
    let bottom = Rgb([digest[3], digest[4], digest[5]]);
    let image = RgbImage::from_fn(DRYRUN_WIDTH, DRYRUN_HEIGHT, |_, y| {
        if y < DRYRUN_HEIGHT / 2 {
            top
        } else {
            bottom
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| GenerationError::InvalidPayload(format!("dryrun png encode failed: {err}")))?;
    Ok(BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    use fitroom_contracts::assets::ImageData;
    use fitroom_contracts::catalog::POSE_CATALOG;
    use fitroom_contracts::studio::{GenerationRequest, PoseInstruction, Variation};

    use super::{DryrunService, DRYRUN_HEIGHT, DRYRUN_WIDTH};
    use crate::service::TryOnService;

    fn request(index: u8) -> GenerationRequest {
        GenerationRequest {
            face: ImageData::png("FACE"),
            product: ImageData::png("PRODUCT"),
            pose: PoseInstruction::Description("jumping".to_string()),
            background: None,
            variation: Variation { index, total: 2 },
        }
    }

    #[test]
    fn try_on_output_is_a_decodable_png() -> anyhow::Result<()> {
        let encoded = DryrunService.generate_try_on(&request(1))?;
        let bytes = BASE64.decode(encoded)?;
        let decoded = image::load_from_memory(&bytes)?;
        assert_eq!(decoded.width(), DRYRUN_WIDTH);
        assert_eq!(decoded.height(), DRYRUN_HEIGHT);
        Ok(())
    }

    #[test]
    fn outputs_are_deterministic_and_vary_by_variation() -> anyhow::Result<()> {
        let first = DryrunService.generate_try_on(&request(1))?;
        assert_eq!(first, DryrunService.generate_try_on(&request(1))?);
        assert_ne!(first, DryrunService.generate_try_on(&request(2))?);
        Ok(())
    }

    #[test]
    fn descriptions_come_from_the_pose_catalog() -> anyhow::Result<()> {
        let text = DryrunService.describe_pose(&ImageData::png("POSE"))?;
        assert!(POSE_CATALOG.iter().any(|entry| entry.description == text));
        Ok(())
    }
}
