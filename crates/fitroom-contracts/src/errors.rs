use thiserror::Error;

/// Input missing or inconsistent before an action may start.
///
/// The studio surface checks these before offering an action, so they are
/// reported to the operator but never land in the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a face image first.")]
    MissingFace,
    #[error("Please approve a product image first.")]
    ProductNotApproved,
    #[error("Pose is not resolved for the current mode: {0}")]
    PoseUnresolved(&'static str),
    #[error("Another {0} request is still in flight.")]
    Busy(&'static str),
    #[error("Pose mode '{0}' is unavailable while generating multiple variations.")]
    ModeRequiresSingleVariation(&'static str),
    #[error("Unknown {kind} catalog entry {id}.")]
    UnknownCatalogEntry { kind: &'static str, id: u32 },
    #[error("Image has no encoded data.")]
    MissingImageData,
    #[error("No result at position {0}.")]
    NoSuchResult(usize),
    #[error("Product is not awaiting approval.")]
    NothingToApprove,
}

/// Failure of a call against the external generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
    #[error("Generation request failed: {0}")]
    Transport(String),
    #[error("Generation service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("No image data found in the generation response.")]
    NoImage,
    #[error("Generation response contained no usable text.")]
    EmptyResponse,
    #[error("Malformed structured response: {0}")]
    MalformedStructured(String),
    #[error("Invalid generation payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage serialization failed for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("storage write rejected: {0}")]
    Rejected(String),
}
