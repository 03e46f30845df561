use crate::assets::ImageData;

use super::inputs::{BackgroundField, BackgroundSpec, PoseField, PoseSpec};

pub const MIN_VARIATIONS: u8 = 1;
pub const MAX_VARIATIONS: u8 = 4;
pub const DEFAULT_POSE_DESCRIPTION: &str = "A model in a natural standing pose";

/// Position of one request inside a batch, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variation {
    pub index: u8,
    pub total: u8,
}

impl Variation {
    pub fn single() -> Self {
        Self { index: 1, total: 1 }
    }

    pub fn is_multi(&self) -> bool {
        self.total > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseInstruction {
    Reference(ImageData),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundInstruction {
    Reference(ImageData),
    Description(String),
}

/// One composition call. `background: None` asks for the neutral studio default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub face: ImageData,
    pub product: ImageData,
    pub pose: PoseInstruction,
    pub background: Option<BackgroundInstruction>,
    pub variation: Variation,
}

pub fn resolve_pose(field: &PoseField, multi_variation: bool) -> PoseInstruction {
    if multi_variation {
        return PoseInstruction::Description(field.text().trim().to_string());
    }
    match field.spec() {
        PoseSpec::Describe(text) => PoseInstruction::Description(text.trim().to_string()),
        PoseSpec::Catalog(Some(entry)) => {
            PoseInstruction::Description(entry.description.to_string())
        }
        PoseSpec::Upload(Some(uploaded)) => match &uploaded.image.data {
            Some(data) => PoseInstruction::Reference(data.clone()),
            None => fallback_pose(field),
        },
        PoseSpec::Catalog(None) | PoseSpec::Upload(None) => fallback_pose(field),
    }
}

fn fallback_pose(field: &PoseField) -> PoseInstruction {
    let text = field.text().trim();
    if text.is_empty() {
        PoseInstruction::Description(DEFAULT_POSE_DESCRIPTION.to_string())
    } else {
        PoseInstruction::Description(text.to_string())
    }
}

pub fn resolve_background(field: &BackgroundField) -> Option<BackgroundInstruction> {
    match field.spec() {
        BackgroundSpec::None => None,
        BackgroundSpec::Upload(image) => image
            .as_ref()
            .and_then(|asset| asset.data.clone())
            .map(BackgroundInstruction::Reference),
        BackgroundSpec::Describe(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| BackgroundInstruction::Description(text.to_string()))
        }
        BackgroundSpec::Catalog(entry) => {
            entry.map(|entry| BackgroundInstruction::Description(entry.description.to_string()))
        }
    }
}

/// `total` requests identical except for their variation index.
pub fn build_requests(
    face: &ImageData,
    product: &ImageData,
    pose: &PoseInstruction,
    background: Option<&BackgroundInstruction>,
    total: u8,
) -> Vec<GenerationRequest> {
    let total = total.clamp(MIN_VARIATIONS, MAX_VARIATIONS);
    (1..=total)
        .map(|index| GenerationRequest {
            face: face.clone(),
            product: product.clone(),
            pose: pose.clone(),
            background: background.cloned(),
            variation: Variation { index, total },
        })
        .collect()
}
