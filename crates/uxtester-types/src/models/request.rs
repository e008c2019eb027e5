//! Analysis request and result models.

use serde::{Deserialize, Serialize};

/// One uploaded image, already base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImagePart {
    /// Base64 payload (standard alphabet, no data-URL prefix)
    pub data: String,
    /// MIME type, e.g. "image/png"
    pub mime_type: String,
}

impl ImagePart {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self { data: data.into(), mime_type: mime_type.into() }
    }

    /// Decoded size in KB estimated from the base64 length.
    pub fn estimated_size_kb(&self) -> f64 {
        (self.data.len() as f64 * 3.0) / 4.0 / 1024.0
    }
}

/// Limits applied to the images of a request before any network call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageLimits {
    pub max_images: usize,
    /// Per-image decoded size limit
    pub max_image_kb: f64,
    /// Decoded size limit over all images
    pub max_total_kb: f64,
    pub supported_mime_types: Vec<String>,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_images: 3,
            max_image_kb: 4000.0,
            max_total_kb: 8000.0,
            supported_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

/// A logical analysis request: ordered images plus the prompt text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    pub images: Vec<ImagePart>,
    pub prompt_text: String,
    #[serde(default)]
    pub limits: ImageLimits,
}

impl AnalysisRequest {
    pub fn new(images: Vec<ImagePart>, prompt_text: impl Into<String>) -> Self {
        Self { images, prompt_text: prompt_text.into(), limits: ImageLimits::default() }
    }

    pub fn with_limits(mut self, limits: ImageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Estimated decoded size of all images in KB.
    pub fn total_size_kb(&self) -> f64 {
        self.images.iter().map(ImagePart::estimated_size_kb).sum()
    }
}

/// Successful outcome of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Generated critique (markdown)
    pub content: String,
    /// Model that produced the content
    pub model: String,
    pub image_count: usize,
    pub timestamp_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_estimate_follows_base64_ratio() {
        // 4096 base64 chars decode to 3072 bytes = 3 KB
        let part = ImagePart::new("A".repeat(4096), "image/png");
        assert!((part.estimated_size_kb() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_size_sums_all_images() {
        let request = AnalysisRequest::new(
            vec![ImagePart::new("A".repeat(4096), "image/png"), ImagePart::new("B".repeat(8192), "image/jpeg")],
            "compare",
        );
        assert!((request.total_size_kb() - 9.0).abs() < f64::EPSILON);
    }
}
