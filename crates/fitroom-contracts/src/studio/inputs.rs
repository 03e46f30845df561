use crate::assets::ImageAsset;
use crate::catalog::{BackgroundEntry, PoseEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseMode {
    Select,
    Describe,
    Upload,
}

impl PoseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Describe => "describe",
            Self::Upload => "upload",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "select" => Some(Self::Select),
            "describe" => Some(Self::Describe),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }
}

/// Pose reference awaiting its description. Once the description arrives the
/// field switches to describe mode holding that text, and the image is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPose {
    pub image: ImageAsset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseSpec {
    Catalog(Option<&'static PoseEntry>),
    Describe(String),
    Upload(Option<UploadedPose>),
}

impl PoseSpec {
    pub fn mode(&self) -> PoseMode {
        match self {
            Self::Catalog(_) => PoseMode::Select,
            Self::Describe(_) => PoseMode::Describe,
            Self::Upload(_) => PoseMode::Upload,
        }
    }
}

/// Active pose input plus the last description typed, so that leaving and
/// re-entering describe mode keeps the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoseField {
    spec: PoseSpec,
    remembered_text: String,
}

impl Default for PoseField {
    fn default() -> Self {
        Self {
            spec: PoseSpec::Catalog(None),
            remembered_text: String::new(),
        }
    }
}

impl PoseField {
    pub fn spec(&self) -> &PoseSpec {
        &self.spec
    }

    pub fn mode(&self) -> PoseMode {
        self.spec.mode()
    }

    pub fn text(&self) -> &str {
        match &self.spec {
            PoseSpec::Describe(text) => text,
            _ => &self.remembered_text,
        }
    }

    pub fn switch_mode(&mut self, mode: PoseMode) {
        if self.mode() == mode {
            return;
        }
        if let PoseSpec::Describe(text) = &self.spec {
            self.remembered_text = text.clone();
        }
        self.spec = match mode {
            PoseMode::Select => PoseSpec::Catalog(None),
            PoseMode::Describe => PoseSpec::Describe(self.remembered_text.clone()),
            PoseMode::Upload => PoseSpec::Upload(None),
        };
    }

    pub fn select(&mut self, entry: &'static PoseEntry) {
        self.switch_mode(PoseMode::Select);
        self.spec = PoseSpec::Catalog(Some(entry));
    }

    pub fn describe(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.remembered_text = text.clone();
        self.spec = PoseSpec::Describe(text);
    }

    pub fn upload(&mut self, image: ImageAsset) {
        self.switch_mode(PoseMode::Upload);
        self.spec = PoseSpec::Upload(Some(UploadedPose { image }));
    }

    pub fn uploaded(&self) -> Option<&UploadedPose> {
        match &self.spec {
            PoseSpec::Upload(uploaded) => uploaded.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    None,
    Select,
    Upload,
    Describe,
}

impl BackgroundMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Select => "select",
            Self::Upload => "upload",
            Self::Describe => "describe",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "select" => Some(Self::Select),
            "upload" => Some(Self::Upload),
            "describe" => Some(Self::Describe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackgroundSpec {
    #[default]
    None,
    Catalog(Option<&'static BackgroundEntry>),
    Describe(String),
    Upload(Option<ImageAsset>),
}

impl BackgroundSpec {
    pub fn mode(&self) -> BackgroundMode {
        match self {
            Self::None => BackgroundMode::None,
            Self::Catalog(_) => BackgroundMode::Select,
            Self::Describe(_) => BackgroundMode::Describe,
            Self::Upload(_) => BackgroundMode::Upload,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundField {
    spec: BackgroundSpec,
    remembered_text: String,
}

impl BackgroundField {
    pub fn spec(&self) -> &BackgroundSpec {
        &self.spec
    }

    pub fn mode(&self) -> BackgroundMode {
        self.spec.mode()
    }

    pub fn text(&self) -> &str {
        match &self.spec {
            BackgroundSpec::Describe(text) => text,
            _ => &self.remembered_text,
        }
    }

    pub fn switch_mode(&mut self, mode: BackgroundMode) {
        if self.mode() == mode {
            return;
        }
        if let BackgroundSpec::Describe(text) = &self.spec {
            self.remembered_text = text.clone();
        }
        self.spec = match mode {
            BackgroundMode::None => BackgroundSpec::None,
            BackgroundMode::Select => BackgroundSpec::Catalog(None),
            BackgroundMode::Upload => BackgroundSpec::Upload(None),
            BackgroundMode::Describe => BackgroundSpec::Describe(self.remembered_text.clone()),
        };
    }

    pub fn select(&mut self, entry: &'static BackgroundEntry) {
        self.switch_mode(BackgroundMode::Select);
        self.spec = BackgroundSpec::Catalog(Some(entry));
    }

    pub fn describe(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.remembered_text = text.clone();
        self.spec = BackgroundSpec::Describe(text);
    }

    pub fn upload(&mut self, image: ImageAsset) {
        self.switch_mode(BackgroundMode::Upload);
        self.spec = BackgroundSpec::Upload(Some(image));
    }
}

#[cfg(test)]
mod tests {
    use super::{BackgroundField, BackgroundMode, PoseField, PoseMode, PoseSpec};
    use crate::assets::{ImageAsset, ImageData};
    use crate::catalog::{background_by_id, pose_by_id};

    #[test]
    fn pose_defaults_to_empty_catalog_choice() {
        let field = PoseField::default();
        assert_eq!(field.spec(), &PoseSpec::Catalog(None));
        assert_eq!(field.text(), "");
    }

    #[test]
    fn describe_text_survives_mode_round_trip() {
        let mut field = PoseField::default();
        field.describe("arms crossed, looking left");
        field.switch_mode(PoseMode::Select);
        assert_eq!(field.text(), "arms crossed, looking left");
        field.switch_mode(PoseMode::Describe);
        assert_eq!(
            field.spec(),
            &PoseSpec::Describe("arms crossed, looking left".to_string())
        );
    }

    #[test]
    fn selecting_replaces_other_inputs() {
        let mut field = PoseField::default();
        field.upload(ImageAsset::generated(ImageData::png("AAAA")));
        assert!(field.uploaded().is_some());

        let entry = pose_by_id(2).expect("catalog entry");
        field.select(entry);
        assert_eq!(field.spec(), &PoseSpec::Catalog(Some(entry)));
        assert!(field.uploaded().is_none());
    }

    #[test]
    fn background_modes_parse_and_switch() {
        assert_eq!(BackgroundMode::parse("Upload"), Some(BackgroundMode::Upload));
        assert_eq!(BackgroundMode::parse("sky"), None);

        let mut field = BackgroundField::default();
        assert_eq!(field.mode(), BackgroundMode::None);
        field.describe("foggy pier at dawn");
        field.select(background_by_id(1).expect("catalog entry"));
        assert_eq!(field.mode(), BackgroundMode::Select);
        field.switch_mode(BackgroundMode::Describe);
        assert_eq!(field.text(), "foggy pier at dawn");
    }
}
