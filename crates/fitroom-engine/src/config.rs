use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DATA_DIR: &str = ".fitroom";

const DEFAULT_TIMEOUT_S: f64 = 90.0;
const MIN_TIMEOUT_S: f64 = 15.0;
const MAX_TIMEOUT_S: f64 = 300.0;

/// Runtime settings for the engine, resolved from `FITROOM_*` and Gemini
/// environment variables. CLI flags overwrite individual fields afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub provider: String,
    pub image_model: String,
    pub text_model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: "dryrun".to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_S),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("GOOGLE_API_KEY"));
        let provider = non_empty("FITROOM_PROVIDER")
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_else(|| {
                if api_key.is_some() {
                    "gemini".to_string()
                } else {
                    "dryrun".to_string()
                }
            });
        let request_timeout = non_empty("FITROOM_REQUEST_TIMEOUT")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_TIMEOUT_S)
            .clamp(MIN_TIMEOUT_S, MAX_TIMEOUT_S);

        Self {
            provider,
            image_model: non_empty("FITROOM_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            text_model: non_empty("FITROOM_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key,
            request_timeout: Duration::from_secs_f64(request_timeout),
            data_dir: non_empty("FITROOM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.jsonl")
    }
}
