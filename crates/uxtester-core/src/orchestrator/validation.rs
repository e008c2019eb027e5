//! Local request validation. Runs before any network call.

use regex::Regex;
use std::sync::LazyLock;
use uxtester_types::{AnalysisRequest, ClassifiedError};

static BASE64: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("Base64 regex is valid"));

/// Check image count, encoding, type and size against the request's limits.
///
/// Image numbers in messages are 1-based.
pub fn validate_request(request: &AnalysisRequest) -> Result<(), ClassifiedError> {
    let limits = &request.limits;

    if request.images.is_empty() {
        return Err(ClassifiedError::validation("images", "Please upload at least one image."));
    }
    if request.images.len() > limits.max_images {
        return Err(ClassifiedError::validation(
            "images",
            format!(
                "At most {} images can be analyzed at once ({} given).",
                limits.max_images,
                request.images.len()
            ),
        ));
    }
    if request.prompt_text.trim().is_empty() {
        return Err(ClassifiedError::validation("prompt_text", "The prompt text is empty."));
    }

    for (index, image) in request.images.iter().enumerate() {
        let number = index + 1;
        if image.data.is_empty() {
            return Err(ClassifiedError::validation(
                &format!("images[{number}].data"),
                format!("Image {number} is empty."),
            ));
        }
        if !BASE64.is_match(&image.data) {
            return Err(ClassifiedError::validation(
                &format!("images[{number}].data"),
                format!("Image {number} is not valid base64 data."),
            ));
        }
        if !limits.supported_mime_types.iter().any(|m| m == &image.mime_type) {
            return Err(ClassifiedError::validation(
                &format!("images[{number}].mime_type"),
                format!(
                    "Image {number} has unsupported type {}. Supported types: {}.",
                    image.mime_type,
                    limits.supported_mime_types.join(", ")
                ),
            ));
        }
        let size_kb = image.estimated_size_kb();
        if size_kb > limits.max_image_kb {
            return Err(ClassifiedError::validation(
                &format!("images[{number}].data"),
                format!(
                    "Image {number} is too large ({size_kb:.0}KB). The limit is {:.0}KB.",
                    limits.max_image_kb
                ),
            ));
        }
    }

    let total_kb = request.total_size_kb();
    if total_kb > limits.max_total_kb {
        return Err(ClassifiedError::validation(
            "images",
            format!(
                "The images are too large in total ({total_kb:.0}KB). The limit is {:.0}KB.",
                limits.max_total_kb
            ),
        ));
    }

    Ok(())
}
