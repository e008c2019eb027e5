//! API key format checks and credential masking for diagnostics.

use regex::Regex;
use std::sync::LazyLock;
use uxtester_types::KeyError;

const MIN_KEY_LEN: usize = 20;
const MAX_KEY_LEN: usize = 200;

static KEY_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_.]+$").expect("Key charset regex is valid"));

static GOOGLE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AIza[A-Za-z0-9_-]{35}").expect("Google key regex is valid"));

static SECRET_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[A-Za-z0-9]{20,}").expect("Secret key regex is valid"));

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9_\-.]+").expect("Bearer regex is valid"));

static KEY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&]key=)[^&\s]+").expect("Key param regex is valid"));

/// Check a candidate API key and return it trimmed.
pub fn validate_api_key_format(raw: &str) -> Result<String, KeyError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(KeyError::InvalidFormat { reason: "API key is empty".to_string() });
    }
    if key.len() < MIN_KEY_LEN {
        return Err(KeyError::InvalidFormat { reason: "API key is too short".to_string() });
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KeyError::InvalidFormat { reason: "API key is too long".to_string() });
    }
    if !KEY_CHARSET.is_match(key) {
        return Err(KeyError::InvalidFormat {
            reason: "API key contains invalid characters".to_string(),
        });
    }
    Ok(key.to_string())
}

/// Replace credential-like substrings before a message is logged.
pub fn mask_sensitive_info(text: &str) -> String {
    let masked = GOOGLE_KEY.replace_all(text, "AIza***MASKED***");
    let masked = SECRET_KEY.replace_all(&masked, "sk-***MASKED***");
    let masked = BEARER.replace_all(&masked, "Bearer ***MASKED***");
    KEY_PARAM.replace_all(&masked, "${1}***MASKED***").into_owned()
}

/// Short tail of a key for display ("...abcd").
pub fn key_hint(key: &str) -> String {
    let tail: String =
        key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("...{tail}")
}
