use crate::assets::{ImageAsset, ImageData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Idle,
    Rendering,
    PendingApproval,
    Approved,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rendering => "rendering",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
        }
    }
}

/// Product approval workflow.
///
/// The raw upload is kept alongside the standardized rendering so both can be
/// shown side by side while approval is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProductState {
    #[default]
    Idle,
    Rendering {
        raw: ImageAsset,
    },
    PendingApproval {
        raw: ImageAsset,
        rendered: ImageAsset,
    },
    Approved {
        raw: ImageAsset,
        rendered: ImageAsset,
    },
}

impl ProductState {
    pub fn status(&self) -> ProductStatus {
        match self {
            Self::Idle => ProductStatus::Idle,
            Self::Rendering { .. } => ProductStatus::Rendering,
            Self::PendingApproval { .. } => ProductStatus::PendingApproval,
            Self::Approved { .. } => ProductStatus::Approved,
        }
    }

    pub fn raw(&self) -> Option<&ImageAsset> {
        match self {
            Self::Idle => None,
            Self::Rendering { raw }
            | Self::PendingApproval { raw, .. }
            | Self::Approved { raw, .. } => Some(raw),
        }
    }

    pub fn rendered(&self) -> Option<&ImageAsset> {
        match self {
            Self::PendingApproval { rendered, .. } | Self::Approved { rendered, .. } => {
                Some(rendered)
            }
            _ => None,
        }
    }

    /// The rendered garment, available only once approved.
    pub fn approved_product(&self) -> Option<&ImageData> {
        match self {
            Self::Approved { rendered, .. } => rendered.data.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn start_rendering(&mut self, raw: ImageAsset) {
        *self = Self::Rendering { raw };
    }

    /// Returns `false` when no render was pending.
    pub(crate) fn complete_render(&mut self, rendered_base64: String) -> bool {
        match std::mem::take(self) {
            Self::Rendering { raw } => {
                *self = Self::PendingApproval {
                    raw,
                    rendered: ImageAsset::generated(ImageData::png(rendered_base64)),
                };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    pub(crate) fn approve(&mut self) -> bool {
        match std::mem::take(self) {
            Self::PendingApproval { raw, rendered } => {
                *self = Self::Approved { raw, rendered };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::Idle;
    }
}
