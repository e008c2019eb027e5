//! Configuration loading: JSON file, then environment overrides, then validation.

use crate::catalog::ModelCatalog;
use std::fs;
use std::path::Path;
use uxtester_types::{ConfigError, OrchestratorConfig};

pub const ENV_BASE_URL: &str = "UXTESTER_BASE_URL";
pub const ENV_MODEL: &str = "UXTESTER_MODEL";
pub const ENV_MAX_RETRIES: &str = "UXTESTER_MAX_RETRIES";

/// Upper bound for `retry.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Load configuration from `path` (defaults when absent or missing), apply
/// environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<OrchestratorConfig, ConfigError> {
    let mut config = match path {
        Some(path) if path.exists() => read_config_file(path)?,
        Some(path) => {
            tracing::info!("Config file {} not found, using defaults", path.display());
            OrchestratorConfig::default()
        },
        None => OrchestratorConfig::default(),
    };
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Defaults plus environment overrides.
pub fn config_from_env() -> Result<OrchestratorConfig, ConfigError> {
    load_config(None)
}

fn read_config_file(path: &Path) -> Result<OrchestratorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError { message: e.to_string() })
}

pub fn apply_env_overrides(config: &mut OrchestratorConfig) {
    apply_env_overrides_from(config, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`. Invalid values are ignored with a warning.
pub fn apply_env_overrides_from(
    config: &mut OrchestratorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(raw) = lookup(ENV_BASE_URL) {
        let url = raw.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            tracing::warn!("{} is empty, using {}", ENV_BASE_URL, config.base_url);
        } else if url::Url::parse(&url).is_err() {
            tracing::warn!("{} is not a valid URL, using {}", ENV_BASE_URL, config.base_url);
        } else {
            tracing::info!("Using custom API base URL");
            config.base_url = url;
        }
    }

    if let Some(raw) = lookup(ENV_MODEL) {
        let model = raw.trim();
        if model.is_empty() {
            tracing::warn!("{} is empty, keeping {}", ENV_MODEL, config.default_model);
        } else if ModelCatalog::default().get(model).is_none() {
            tracing::warn!("{} names unknown model {}, keeping {}", ENV_MODEL, model, config.default_model);
        } else {
            config.default_model = model.to_string();
        }
    }

    if let Some(raw) = lookup(ENV_MAX_RETRIES) {
        match raw.trim().parse::<u32>() {
            Ok(retries) if retries <= MAX_RETRIES_LIMIT => config.retry.max_retries = retries,
            Ok(retries) => tracing::warn!(
                "{} of {} exceeds {}, keeping {}",
                ENV_MAX_RETRIES,
                retries,
                MAX_RETRIES_LIMIT,
                config.retry.max_retries
            ),
            Err(_) => tracing::warn!(
                "{} is not a number, keeping {}",
                ENV_MAX_RETRIES,
                config.retry.max_retries
            ),
        }
    }
}

pub fn validate_config(config: &OrchestratorConfig) -> Result<(), ConfigError> {
    if url::Url::parse(&config.base_url).is_err() {
        return Err(ConfigError::invalid("base_url", format!("not a valid URL: {}", config.base_url)));
    }
    if config.default_model.trim().is_empty() {
        return Err(ConfigError::invalid("default_model", "must not be empty"));
    }
    if ModelCatalog::default().get(&config.default_model).is_none() {
        return Err(ConfigError::invalid(
            "default_model",
            format!("unknown model {}", config.default_model),
        ));
    }
    if config.retry.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::invalid(
            "retry.max_retries",
            format!("must be at most {MAX_RETRIES_LIMIT}"),
        ));
    }
    if config.limits.max_images == 0 {
        return Err(ConfigError::invalid("limits.max_images", "must be at least 1"));
    }
    if !(config.retry.backoff_multiplier >= 1.0) {
        return Err(ConfigError::invalid("retry.backoff_multiplier", "must be at least 1.0"));
    }
    if config.timeouts.probe_ms == 0 || config.timeouts.first_attempt_ms == 0 {
        return Err(ConfigError::invalid("timeouts", "timeouts must be non-zero"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    // ── overrides ─────────────────────────────────────────────────────

    #[test]
    fn valid_overrides_apply() {
        let mut config = OrchestratorConfig::default();
        apply_env_overrides_from(
            &mut config,
            env(&[
                (ENV_BASE_URL, " http://localhost:8080/v1beta/ "),
                (ENV_MODEL, "gemini-2.5-pro"),
                (ENV_MAX_RETRIES, "5"),
            ]),
        );
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.default_model, "gemini-2.5-pro");
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut config = OrchestratorConfig::default();
        apply_env_overrides_from(
            &mut config,
            env(&[(ENV_BASE_URL, "not a url"), (ENV_MODEL, "  "), (ENV_MAX_RETRIES, "many")]),
        );
        assert_eq!(config, OrchestratorConfig::default());
    }

    // ── validation ────────────────────────────────────────────────────

    #[test]
    fn defaults_validate() {
        assert_eq!(validate_config(&OrchestratorConfig::default()), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = OrchestratorConfig::default();
        config.limits.max_images = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "limits.max_images"
        ));

        let mut config = OrchestratorConfig::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(validate_config(&config).is_err());

        let mut config = OrchestratorConfig::default();
        config.base_url = "::".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_oversized_retry_budget() {
        let mut config = OrchestratorConfig::default();
        config.retry.max_retries = u32::MAX;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "retry.max_retries"
        ));

        config.retry.max_retries = MAX_RETRIES_LIMIT;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn oversized_retry_override_is_ignored() {
        let mut config = OrchestratorConfig::default();
        apply_env_overrides_from(&mut config, env(&[(ENV_MAX_RETRIES, "4294967295")]));
        assert_eq!(config.retry.max_retries, OrchestratorConfig::default().retry.max_retries);
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut config = OrchestratorConfig::default();
        apply_env_overrides_from(&mut config, env(&[(ENV_MODEL, "gemini-0.1-imaginary")]));
        assert_eq!(config.default_model, OrchestratorConfig::default().default_model);

        config.default_model = "gemini-0.1-imaginary".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "default_model"
        ));
    }

    #[test]
    fn file_with_unknown_model_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_model":"not-a-gemini-model"}}"#).unwrap();
        let config = read_config_file(file.path()).unwrap();
        assert!(validate_config(&config).is_err());
    }

    // ── files ─────────────────────────────────────────────────────────

    #[test]
    fn loads_partial_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_model":"gemini-1.5-pro","retry":{{"max_retries":1}}}}"#).unwrap();
        let config = read_config_file(file.path()).unwrap();
        assert_eq!(config.default_model, "gemini-1.5-pro");
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.timeouts.probe_ms, 10_000);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(read_config_file(file.path()), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn missing_file_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(!missing.exists());
        assert!(matches!(read_config_file(&missing), Err(ConfigError::ReadError { .. })));
    }
}
