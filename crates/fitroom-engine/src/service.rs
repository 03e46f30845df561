use std::collections::BTreeMap;

use fitroom_contracts::assets::ImageData;
use fitroom_contracts::errors::GenerationError;
use fitroom_contracts::studio::GenerationRequest;

/// One round trip per call against an image/text generation backend.
///
/// Image-producing calls return the base64 payload of a PNG; text calls
/// return the suggestion or description. Nothing is retried.
pub trait TryOnService: Send + Sync {
    fn name(&self) -> &str;
    fn render_product(&self, product: &ImageData) -> Result<String, GenerationError>;
    fn describe_pose(&self, image: &ImageData) -> Result<String, GenerationError>;
    fn creative_pose(&self, rendered: &ImageData) -> Result<String, GenerationError>;
    fn creative_background(&self, rendered: &ImageData) -> Result<String, GenerationError>;
    fn generate_try_on(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Box<dyn TryOnService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: TryOnService + 'static>(&mut self, service: S) {
        self.services
            .insert(service.name().to_string(), Box::new(service));
    }

    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn take(mut self, name: &str) -> Option<Box<dyn TryOnService>> {
        self.services.remove(name)
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.services.keys()).finish()
    }
}
