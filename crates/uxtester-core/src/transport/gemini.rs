//! Gemini `generateContent` request and response shapes.

use serde::Deserialize;
use serde_json::{json, Value};
use uxtester_types::ImagePart;

/// Text sent by model probes.
pub const PROBE_PROMPT: &str = "Hello";

/// `POST {base}/models/{model}:generateContent?key={key}`
pub fn generate_content_url(base_url: &str, model: &str, api_key: &str) -> String {
    format!("{}/models/{}:generateContent?key={}", base_url.trim_end_matches('/'), model, api_key)
}

/// `GET {base}/models?key={key}`, used as a connectivity check.
pub fn list_models_url(base_url: &str, api_key: &str) -> String {
    format!("{}/models?key={}", base_url.trim_end_matches('/'), api_key)
}

/// Body with one text part followed by one inline-data part per image.
pub fn generate_content_body(prompt: &str, images: &[ImagePart]) -> Value {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(json!({ "text": prompt }));
    parts.extend(images.iter().map(|image| {
        json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": image.data,
            }
        })
    }));
    json!({ "contents": [{ "parts": parts }] })
}

pub fn probe_body() -> Value {
    generate_content_body(PROBE_PROMPT, &[])
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Reads `candidates[0].content.parts[0].text`.
///
/// `Err` carries a short reason when the path is missing, empty or the body
/// is not JSON.
pub fn extract_text(body: &str) -> Result<String, String> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {e}"))?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| "response has no candidates[0].content.parts[0].text".to_string())?;
    if text.is_empty() {
        return Err("response text is empty".to_string());
    }
    Ok(text)
}
