//! The try-on session: every input the user has provided, the product
//! approval workflow, outstanding asynchronous work and the latest results.
//!
//! Calls to the generation service are split into `begin_*` and `finish_*`.
//! `begin_*` performs the synchronous transition and hands back a ticket plus
//! the payload to submit; `finish_*` applies the outcome only when the ticket
//! is still the latest one for its slot.

mod inputs;
mod product;
mod request;
mod tokens;

use crate::assets::{data_url, ImageAsset, ImageData, RENDERED_MIME_TYPE};
use crate::catalog::{background_by_id, pose_by_id};
use crate::errors::{GenerationError, ValidationError};
use crate::gallery::Gallery;
use crate::storage::PersistentStore;
use crate::theme::{Theme, ThemePreference};

pub use inputs::{
    BackgroundField, BackgroundMode, BackgroundSpec, PoseField, PoseMode, PoseSpec, UploadedPose,
};
pub use product::{ProductState, ProductStatus};
pub use request::{
    build_requests, resolve_background, resolve_pose, BackgroundInstruction, GenerationRequest,
    PoseInstruction, Variation, DEFAULT_POSE_DESCRIPTION, MAX_VARIATIONS, MIN_VARIATIONS,
};
pub use tokens::{RequestTokens, Settled, Slot, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspireTarget {
    Pose,
    Background,
}

impl InspireTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::Background => "background",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderCall {
    pub ticket: Ticket,
    pub product: ImageData,
}

#[derive(Debug, Clone)]
pub struct DescribeCall {
    pub ticket: Ticket,
    pub image: ImageData,
}

#[derive(Debug, Clone)]
pub struct InspireCall {
    pub ticket: Ticket,
    pub target: InspireTarget,
    pub product: ImageData,
}

#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub ticket: Ticket,
    pub requests: Vec<GenerationRequest>,
}

pub struct Studio {
    face: Option<ImageAsset>,
    product: ProductState,
    pose: PoseField,
    background: BackgroundField,
    variations: u8,
    results: Option<Vec<String>>,
    banner: Option<String>,
    tokens: RequestTokens,
    gallery: Gallery,
    theme: ThemePreference,
}

impl Studio {
    pub fn new(
        gallery_store: Box<dyn PersistentStore<Vec<String>>>,
        theme_store: Box<dyn PersistentStore<Theme>>,
    ) -> Self {
        Self {
            face: None,
            product: ProductState::default(),
            pose: PoseField::default(),
            background: BackgroundField::default(),
            variations: MIN_VARIATIONS,
            results: None,
            banner: None,
            tokens: RequestTokens::default(),
            gallery: Gallery::load(gallery_store),
            theme: ThemePreference::load(theme_store),
        }
    }

    pub fn face(&self) -> Option<&ImageAsset> {
        self.face.as_ref()
    }

    pub fn product(&self) -> &ProductState {
        &self.product
    }

    pub fn product_status(&self) -> ProductStatus {
        self.product.status()
    }

    pub fn pose(&self) -> &PoseField {
        &self.pose
    }

    pub fn background(&self) -> &BackgroundField {
        &self.background
    }

    pub fn variations(&self) -> u8 {
        self.variations
    }

    pub fn is_multi_variation(&self) -> bool {
        self.variations > 1
    }

    pub fn results(&self) -> Option<&[String]> {
        self.results.as_deref()
    }

    /// Message of the last failed action, shown until the next action.
    pub fn error(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.banner = None;
    }

    pub fn is_busy(&self, slot: Slot) -> bool {
        self.tokens.in_flight(slot)
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn theme_mut(&mut self) -> &mut ThemePreference {
        &mut self.theme
    }

    pub fn set_face(&mut self, asset: ImageAsset) {
        self.face = Some(asset);
    }

    pub fn begin_product_upload(&mut self, asset: ImageAsset) -> Result<RenderCall, ValidationError> {
        let product = asset.data.clone().ok_or(ValidationError::MissingImageData)?;
        self.banner = None;
        self.product.start_rendering(asset);
        let ticket = self.tokens.issue(Slot::ProductRender);
        tracing::debug!(token = ticket.token, "product render started");
        Ok(RenderCall { ticket, product })
    }

    pub fn finish_product_render(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, GenerationError>,
    ) -> Settled {
        if self.tokens.settle(ticket) == Settled::Stale {
            tracing::warn!(token = ticket.token, "discarding stale product render");
            return Settled::Stale;
        }
        match outcome {
            Ok(rendered) => {
                self.product.complete_render(rendered);
            }
            Err(err) => {
                self.product.reset();
                self.banner = Some(err.to_string());
            }
        }
        Settled::Applied
    }

    pub fn approve_product(&mut self) -> Result<(), ValidationError> {
        if !self.product.approve() {
            return Err(ValidationError::NothingToApprove);
        }
        self.banner = None;
        Ok(())
    }

    /// Reject a pending rendering or change an approved product.
    pub fn reset_product(&mut self) {
        self.product.reset();
        self.tokens.invalidate(Slot::ProductRender);
        self.banner = None;
    }

    pub fn set_variations(&mut self, requested: u8) -> u8 {
        self.variations = requested.clamp(MIN_VARIATIONS, MAX_VARIATIONS);
        self.normalize_modes();
        self.variations
    }

    pub fn set_pose_mode(&mut self, mode: PoseMode) -> Result<(), ValidationError> {
        self.ensure_single_variation_mode(mode)?;
        self.pose.switch_mode(mode);
        Ok(())
    }

    pub fn select_pose(&mut self, id: u32) -> Result<(), ValidationError> {
        self.ensure_single_variation_mode(PoseMode::Select)?;
        let entry = pose_by_id(id).ok_or(ValidationError::UnknownCatalogEntry { kind: "pose", id })?;
        self.pose.select(entry);
        Ok(())
    }

    pub fn set_pose_text(&mut self, text: impl Into<String>) {
        self.pose.describe(text);
    }

    pub fn begin_pose_upload(&mut self, asset: ImageAsset) -> Result<DescribeCall, ValidationError> {
        self.ensure_single_variation_mode(PoseMode::Upload)?;
        let image = asset.data.clone().ok_or(ValidationError::MissingImageData)?;
        self.banner = None;
        self.pose.upload(asset);
        let ticket = self.tokens.issue(Slot::PoseDescription);
        Ok(DescribeCall { ticket, image })
    }

    pub fn finish_pose_description(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, GenerationError>,
    ) -> Settled {
        if self.tokens.settle(ticket) == Settled::Stale {
            tracing::warn!(token = ticket.token, "discarding stale pose description");
            return Settled::Stale;
        }
        match outcome {
            Ok(text) => self.pose.describe(text),
            Err(err) => self.banner = Some(err.to_string()),
        }
        Settled::Applied
    }

    pub fn set_background_mode(&mut self, mode: BackgroundMode) {
        self.background.switch_mode(mode);
    }

    pub fn select_background(&mut self, id: u32) -> Result<(), ValidationError> {
        let entry = background_by_id(id).ok_or(ValidationError::UnknownCatalogEntry {
            kind: "background",
            id,
        })?;
        self.background.select(entry);
        Ok(())
    }

    pub fn set_background_text(&mut self, text: impl Into<String>) {
        self.background.describe(text);
    }

    pub fn set_background_image(&mut self, asset: ImageAsset) {
        self.background.upload(asset);
    }

    pub fn begin_inspire(&mut self, target: InspireTarget) -> Result<InspireCall, ValidationError> {
        let product = self
            .product
            .approved_product()
            .cloned()
            .ok_or(ValidationError::ProductNotApproved)?;
        for slot in [Slot::Inspire, Slot::Generation] {
            if self.tokens.in_flight(slot) {
                return Err(ValidationError::Busy(slot.label()));
            }
        }
        self.banner = None;
        let ticket = self.tokens.issue(Slot::Inspire);
        Ok(InspireCall {
            ticket,
            target,
            product,
        })
    }

    pub fn finish_inspire(
        &mut self,
        call: &InspireCall,
        outcome: Result<String, GenerationError>,
    ) -> Settled {
        if self.tokens.settle(call.ticket) == Settled::Stale {
            tracing::warn!(token = call.ticket.token, "discarding stale suggestion");
            return Settled::Stale;
        }
        match (outcome, call.target) {
            (Ok(text), InspireTarget::Pose) => self.pose.describe(text),
            (Ok(text), InspireTarget::Background) => self.background.describe(text),
            (Err(err), _) => self.banner = Some(err.to_string()),
        }
        Settled::Applied
    }

    /// Whether generation may start right now, and why not otherwise.
    pub fn can_generate(&self) -> Result<(), ValidationError> {
        if let Some(slot) = self.tokens.busy_slots().next() {
            return Err(ValidationError::Busy(slot.label()));
        }
        if !self.face.as_ref().is_some_and(ImageAsset::is_loaded) {
            return Err(ValidationError::MissingFace);
        }
        if self.product.approved_product().is_none() {
            return Err(ValidationError::ProductNotApproved);
        }
        if self.is_multi_variation() {
            if self.pose.text().trim().is_empty() {
                return Err(ValidationError::PoseUnresolved(
                    "multiple variations need a pose description",
                ));
            }
            return Ok(());
        }
        match self.pose.spec() {
            PoseSpec::Catalog(Some(_)) => Ok(()),
            PoseSpec::Catalog(None) => Err(ValidationError::PoseUnresolved("choose a catalog pose")),
            PoseSpec::Describe(text) if text.trim().is_empty() => {
                Err(ValidationError::PoseUnresolved("describe the pose"))
            }
            PoseSpec::Describe(_) => Ok(()),
            PoseSpec::Upload(Some(uploaded)) if uploaded.image.is_loaded() => Ok(()),
            PoseSpec::Upload(_) => Err(ValidationError::PoseUnresolved("upload a pose reference")),
        }
    }

    pub fn begin_generation(&mut self) -> Result<GenerationCall, ValidationError> {
        self.can_generate()?;
        let face = self
            .face
            .as_ref()
            .and_then(|asset| asset.data.as_ref())
            .ok_or(ValidationError::MissingFace)?;
        let product = self
            .product
            .approved_product()
            .ok_or(ValidationError::ProductNotApproved)?;
        let pose = resolve_pose(&self.pose, self.is_multi_variation());
        let background = resolve_background(&self.background);
        let requests = build_requests(face, product, &pose, background.as_ref(), self.variations);

        self.banner = None;
        self.results = None;
        let ticket = self.tokens.issue(Slot::Generation);
        Ok(GenerationCall { ticket, requests })
    }

    /// Applies a whole batch: either every image or the failure.
    pub fn finish_generation(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<String>, GenerationError>,
    ) -> Settled {
        if self.tokens.settle(ticket) == Settled::Stale {
            tracing::warn!(token = ticket.token, "discarding stale generation batch");
            return Settled::Stale;
        }
        match outcome {
            Ok(images) => {
                self.results = Some(
                    images
                        .iter()
                        .map(|base64| data_url(RENDERED_MIME_TYPE, base64))
                        .collect(),
                );
            }
            Err(err) => {
                self.results = None;
                self.banner = Some(err.to_string());
            }
        }
        Settled::Applied
    }

    pub fn result(&self, index: usize) -> Result<&str, ValidationError> {
        self.results
            .as_ref()
            .and_then(|results| results.get(index))
            .map(String::as_str)
            .ok_or(ValidationError::NoSuchResult(index))
    }

    pub fn is_result_saved(&self, index: usize) -> bool {
        self.result(index)
            .map(|image| self.gallery.contains(image))
            .unwrap_or(false)
    }

    /// Returns `false` when the result was already in the gallery.
    pub fn save_result(&mut self, index: usize) -> Result<bool, ValidationError> {
        let image = self.result(index)?.to_string();
        Ok(self.gallery.save(&image))
    }

    fn ensure_single_variation_mode(&self, mode: PoseMode) -> Result<(), ValidationError> {
        if self.is_multi_variation() && mode != PoseMode::Describe {
            return Err(ValidationError::ModeRequiresSingleVariation(mode.as_str()));
        }
        Ok(())
    }

    // Fixed poses cannot yield distinct variations, so multi-variation forces describe.
    fn normalize_modes(&mut self) {
        if self.is_multi_variation() && self.pose.mode() != PoseMode::Describe {
            self.pose.switch_mode(PoseMode::Describe);
        }
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("face", &self.face.is_some())
            .field("product", &self.product.status())
            .field("pose", &self.pose.mode())
            .field("background", &self.background.mode())
            .field("variations", &self.variations)
            .field("results", &self.results.as_ref().map(Vec::len))
            .field("banner", &self.banner)
            .finish()
    }
}
