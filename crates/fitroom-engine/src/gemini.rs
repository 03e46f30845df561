use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};

use fitroom_contracts::assets::ImageData;
use fitroom_contracts::errors::GenerationError;
use fitroom_contracts::studio::GenerationRequest;

use crate::config::EngineConfig;
use crate::prompts::{
    creative_background_prompt, creative_pose_prompt, try_on_prompt, BACKGROUND_FIELD,
    DESCRIBE_POSE_PROMPT, POSE_FIELD, RENDER_PRODUCT_PROMPT,
};
use crate::service::TryOnService;

const ERROR_BODY_MAX_CHARS: usize = 512;

pub struct GeminiService {
    api_base: String,
    api_key: Option<String>,
    image_model: String,
    text_model: String,
    timeout: std::time::Duration,
    http: HttpClient,
}

impl GeminiService {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            image_model: config.image_model.clone(),
            text_model: config.text_model.clone(),
            timeout: config.request_timeout,
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn post(&self, model: &str, payload: &Value) -> Result<Value, GenerationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerationError::Unavailable(
                "GEMINI_API_KEY or GOOGLE_API_KEY not set".to_string(),
            ));
        };
        let endpoint = self.endpoint_for_model(model);
        tracing::debug!(%endpoint, "gemini request");
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .timeout(self.timeout)
            .json(payload)
            .send()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        response_json_or_error(response)
    }

    fn generate_image(&self, text: &str, images: &[&ImageData]) -> Result<String, GenerationError> {
        let payload = image_payload(text, images);
        let response = self.post(&self.image_model, &payload)?;
        first_inline_image(&response).ok_or(GenerationError::NoImage)
    }

    fn structured_text(&self, prompt: &str, image: &ImageData, field: &str) -> Result<String, GenerationError> {
        let payload = structured_payload(prompt, image, field);
        let response = self.post(&self.text_model, &payload)?;
        let text = first_text(&response).ok_or_else(|| {
            GenerationError::MalformedStructured("response carried no text part".to_string())
        })?;
        parse_structured_field(&text, field)
    }
}

impl TryOnService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    fn render_product(&self, product: &ImageData) -> Result<String, GenerationError> {
        self.generate_image(RENDER_PRODUCT_PROMPT, &[product])
    }

    fn describe_pose(&self, image: &ImageData) -> Result<String, GenerationError> {
        let payload = text_payload(DESCRIBE_POSE_PROMPT, image);
        let response = self.post(&self.text_model, &payload)?;
        first_text(&response)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }

    fn creative_pose(&self, rendered: &ImageData) -> Result<String, GenerationError> {
        self.structured_text(&creative_pose_prompt(), rendered, POSE_FIELD)
    }

    fn creative_background(&self, rendered: &ImageData) -> Result<String, GenerationError> {
        self.structured_text(&creative_background_prompt(), rendered, BACKGROUND_FIELD)
    }

    fn generate_try_on(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = try_on_prompt(request);
        self.generate_image(&prompt.text, &prompt.images)
    }
}

fn inline_part(image: &ImageData) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": image.base64,
        }
    })
}

fn user_contents(text: &str, images: &[&ImageData]) -> Value {
    let mut parts = vec![json!({ "text": text })];
    parts.extend(images.iter().map(|image| inline_part(image)));
    json!([{ "role": "user", "parts": parts }])
}

fn image_payload(text: &str, images: &[&ImageData]) -> Value {
    json!({
        "contents": user_contents(text, images),
        "generationConfig": {
            "responseModalities": ["IMAGE"],
        },
    })
}

fn text_payload(text: &str, image: &ImageData) -> Value {
    json!({
        "contents": user_contents(text, &[image]),
    })
}

fn structured_payload(text: &str, image: &ImageData, field: &str) -> Value {
    let mut properties = Map::new();
    properties.insert(field.to_string(), json!({ "type": "STRING" }));
    json!({
        "contents": user_contents(text, &[image]),
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": properties,
                "required": [field],
            },
        },
    })
}

fn response_json_or_error(response: HttpResponse) -> Result<Value, GenerationError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| GenerationError::Transport(format!("response body read failed: {err}")))?;
    if !status.is_success() {
        return Err(GenerationError::Service {
            status: status.as_u16(),
            body: truncate_text(&body, ERROR_BODY_MAX_CHARS),
        });
    }
    serde_json::from_str(&body)
        .map_err(|err| GenerationError::InvalidPayload(format!("invalid JSON: {err}")))
}

fn candidate_parts(response: &Value) -> impl Iterator<Item = &Value> {
    response
        .get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|candidate| {
            candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(Value::as_array)
        })
        .flatten()
}

fn first_inline_image(response: &Value) -> Option<String> {
    candidate_parts(response).find_map(|part| {
        part.get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(|inline| inline.get("data"))
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
            .map(str::to_string)
    })
}

fn first_text(response: &Value) -> Option<String> {
    let text: String = candidate_parts(response)
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_structured_field(text: &str, field: &str) -> Result<String, GenerationError> {
    let parsed: Value = serde_json::from_str(text.trim())
        .map_err(|err| GenerationError::MalformedStructured(format!("not JSON: {err}")))?;
    let Some(object) = parsed.as_object() else {
        return Err(GenerationError::MalformedStructured(
            "expected a JSON object".to_string(),
        ));
    };
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GenerationError::MalformedStructured(format!("missing {field}")))
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use fitroom_contracts::assets::ImageData;
    use fitroom_contracts::errors::GenerationError;

    use super::{
        first_inline_image, first_text, image_payload, parse_structured_field,
        structured_payload, truncate_text, GeminiService,
    };
    use crate::config::EngineConfig;
    use crate::service::TryOnService;

    #[test]
    fn endpoint_accepts_bare_and_prefixed_models() {
        let service = GeminiService::new(&EngineConfig {
            api_base: "http://localhost:8080/v1beta/".to_string(),
            ..EngineConfig::default()
        });
        assert_eq!(
            service.endpoint_for_model("gemini-2.5-flash-image"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            service.endpoint_for_model(" models/custom "),
            "http://localhost:8080/v1beta/models/custom:generateContent"
        );
    }

    #[test]
    fn missing_api_key_is_unavailable_without_network() {
        let service = GeminiService::new(&EngineConfig::default());
        let err = service
            .render_product(&ImageData::png("AAAA"))
            .expect_err("no key configured");
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[test]
    fn image_payload_puts_text_first_then_images_in_order() {
        let face = ImageData::new("FACE", "image/jpeg");
        let product = ImageData::png("PRODUCT");
        let payload = image_payload("compose", &[&face, &product]);
        let parts = payload["contents"][0]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], json!({ "text": "compose" }));
        assert_eq!(parts[1]["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(parts[2]["inlineData"]["data"], json!("PRODUCT"));
        assert_eq!(
            payload["generationConfig"]["responseModalities"],
            json!(["IMAGE"])
        );
    }

    #[test]
    fn structured_payload_declares_single_field_schema() {
        let payload = structured_payload("inspire", &ImageData::png("R"), "poseDescription");
        let config = &payload["generationConfig"];
        assert_eq!(config["responseMimeType"], json!("application/json"));
        assert_eq!(
            config["responseSchema"]["properties"]["poseDescription"]["type"],
            json!("STRING")
        );
        assert_eq!(config["responseSchema"]["required"], json!(["poseDescription"]));
    }

    #[test]
    fn extracts_first_inline_image_across_candidates() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "here you go" }] } },
                { "content": { "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": "FIRST" } },
                    { "inlineData": { "mimeType": "image/png", "data": "SECOND" } }
                ] } }
            ]
        });
        assert_eq!(first_inline_image(&response).as_deref(), Some("FIRST"));
        assert_eq!(first_inline_image(&json!({ "candidates": [] })), None);
    }

    #[test]
    fn text_parts_are_joined() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Head tilted, " }, { "text": "arms up." }] } }]
        });
        assert_eq!(first_text(&response).as_deref(), Some("Head tilted, arms up."));
        assert_eq!(first_text(&json!({})), None);
    }

    #[test]
    fn structured_field_must_be_non_empty_string() {
        assert_eq!(
            parse_structured_field(r#"{"poseDescription": " Twirl mid-step "}"#, "poseDescription"),
            Ok("Twirl mid-step".to_string())
        );
        for raw in [
            "not json",
            "[1, 2]",
            r#"{"poseDescription": ""}"#,
            r#"{"poseDescription": 3}"#,
            r#"{"backgroundDescription": "beach"}"#,
        ] {
            let err = parse_structured_field(raw, "poseDescription").expect_err(raw);
            assert!(matches!(err, GenerationError::MalformedStructured(_)), "{raw}");
        }
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(600);
        let truncated = truncate_text(&body, 512);
        assert_eq!(truncated.chars().count(), 513);
        assert!(truncated.ends_with('…'));
    }
}
