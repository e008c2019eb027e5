//! Request orchestrator: validation, model assurance, the attempt loop with
//! retry and quota fallback, and progress reporting.
//!
//! ```text
//! Idle -> Validating -> EnsuringModel -> Attempting{0..=max} -> Succeeded | Failed
//! ```
//!
//! `run` takes `&mut self`, so one instance never has two runs in flight and
//! the model selection cannot change under a running request.

mod progress;
mod state;
mod validation;


pub use progress::{FallbackSink, NoProgress, ProgressSink};
pub use state::RunState;
pub use validation::validate_request;

use crate::catalog::ModelCatalog;
use crate::classifier::{classify, RawFailure};
use crate::fallback::FallbackController;
use crate::logger::new_trace_id;
use crate::network::{check_connectivity, NetworkQuality};
use crate::probe::ModelProbe;
use crate::prompt::{build_persona_prompt, critique_request, validate_persona_keyword};
use crate::retry::{format_delay_secs, RetryDecision, RetryPolicy};
use crate::security::{key_hint, mask_sensitive_info, validate_api_key_format};
use crate::selector::{ModelSelector, SessionModelState};
use crate::session::SessionStore;
use crate::transport::gemini::{extract_text, generate_content_body, generate_content_url};
use crate::transport::{post_with_deadline, sleep_or_cancel, Transport};
use progress::ProgressReporter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uxtester_types::{
    AnalysisRequest, AnalysisResult, ClassifiedError, ErrorKind, ImagePart, ModelDescriptor,
    OrchestratorConfig, RetryConfig, TimeoutConfig,
};

/// Which generation a run performs; only affects progress wording and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    ImageAnalysis,
    PersonaGeneration,
}

impl Operation {
    const fn label(self) -> &'static str {
        match self {
            Self::ImageAnalysis => "image analysis",
            Self::PersonaGeneration => "persona generation",
        }
    }

    const fn done_message(self) -> &'static str {
        match self {
            Self::ImageAnalysis => "Image analysis complete",
            Self::PersonaGeneration => "Persona generation complete",
        }
    }
}

/// Serializable snapshot of the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub selected_model: String,
    pub active_model: Option<String>,
    pub models: Vec<ModelDescriptor>,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
    pub has_api_key: bool,
    /// Last characters of the stored key ("...abcd")
    pub key_hint: Option<String>,
    pub has_working_model: bool,
    pub state: RunState,
}

pub struct RequestOrchestrator {
    config: OrchestratorConfig,
    catalog: ModelCatalog,
    transport: Arc<dyn Transport>,
    probe: ModelProbe,
    policy: RetryPolicy,
    session: Arc<SessionStore>,
    models: SessionModelState,
    /// Session generation the cached model state belongs to
    key_generation: u64,
    state: RunState,
    fallback_sink: Option<Box<dyn FallbackSink>>,
}

impl RequestOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        let policy = RetryPolicy::new(config.retry, config.timeouts);
        let probe = ModelProbe::new(transport.clone(), config.base_url.clone(), policy.probe_timeout());
        let models = SessionModelState::new(config.default_model.clone());
        let key_generation = session.generation();
        let mut orchestrator = Self {
            config,
            catalog: ModelCatalog::default(),
            transport,
            probe,
            policy,
            session,
            models,
            key_generation,
            state: RunState::Idle,
            fallback_sink: None,
        };
        orchestrator.reconcile_selection();
        orchestrator
    }

    /// Replace the built-in Gemini catalog.
    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self.reconcile_selection();
        self
    }

    /// Keep the selected model inside the catalog: the configured default
    /// when catalogued, otherwise the first entry.
    fn reconcile_selection(&mut self) {
        if self.catalog.get(self.models.selected_model()).is_some() {
            return;
        }
        let replacement = if self.catalog.get(&self.config.default_model).is_some() {
            Some(self.config.default_model.as_str())
        } else {
            self.catalog.models().first().map(|m| m.id)
        };
        if let Some(model) = replacement {
            tracing::warn!(
                "Model {} is not in the catalog, selecting {}",
                self.models.selected_model(),
                model
            );
            self.models.select(model);
        }
    }

    pub fn set_fallback_sink(&mut self, sink: impl FallbackSink + 'static) {
        self.fallback_sink = Some(Box::new(sink));
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn models(&self) -> &SessionModelState {
        &self.models
    }

    pub fn available_models(&self) -> &'static [ModelDescriptor] {
        self.catalog.models()
    }

    pub fn model_info(&self, id: &str) -> Option<&'static ModelDescriptor> {
        self.catalog.get(id)
    }

    /// Change the preferred model. Unknown ids are rejected; a change drops
    /// the confirmed working model.
    pub fn set_selected_model(&mut self, model: &str) -> Result<(), ClassifiedError> {
        if self.catalog.get(model).is_none() {
            return Err(ClassifiedError::validation(
                "model",
                format!("Unknown model {model}."),
            ));
        }
        self.models.select(model);
        Ok(())
    }

    /// Build a critique request for `images` with this orchestrator's limits.
    pub fn critique_request(
        &self,
        images: Vec<ImagePart>,
        persona: Option<&str>,
        situation: Option<&str>,
    ) -> AnalysisRequest {
        critique_request(images, persona, situation).with_limits(self.config.limits.clone())
    }

    /// Validate `api_key`, find a model that works with it and only then store it.
    pub async fn authenticate(
        &mut self,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ClassifiedError> {
        let api_key = validate_api_key_format(api_key)
            .map_err(|e| ClassifiedError::validation("api_key", e.to_string()))?;

        let selected = self.models.selected_model().to_string();
        let mut candidate = SessionModelState::new(selected.clone());
        let selector = ModelSelector::new(&self.catalog, &self.probe);
        let model =
            selector.ensure_working_model(&mut candidate, Some(&selected), &api_key, cancel).await?;

        self.session
            .set_api_key(&api_key)
            .map_err(|e| ClassifiedError::validation("api_key", e.to_string()))?;
        self.key_generation = self.session.generation();
        self.models = candidate;
        tracing::info!("API key accepted, working model {}", model);
        Ok(model)
    }

    /// Clear the stored key and the confirmed model.
    pub fn logout(&mut self) {
        self.session.clear();
        self.key_generation = self.session.generation();
        self.models.invalidate();
        self.state = RunState::Idle;
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            selected_model: self.models.selected_model().to_string(),
            active_model: self.models.active_model().map(str::to_string),
            models: self.catalog.models().to_vec(),
            timeouts: self.config.timeouts,
            retry: self.config.retry,
            has_api_key: self.session.has_api_key(),
            key_hint: self.session.api_key().as_deref().map(key_hint),
            has_working_model: self.models.active_model().is_some(),
            state: self.state,
        }
    }

    /// Round trip to the model-listing endpoint.
    pub async fn network_quality(
        &self,
        cancel: &CancellationToken,
    ) -> Result<NetworkQuality, ClassifiedError> {
        let api_key = self.session.api_key().unwrap_or_default();
        check_connectivity(
            self.transport.as_ref(),
            &self.config.base_url,
            &api_key,
            self.policy.connectivity_timeout(),
            cancel,
        )
        .await
    }

    /// Run one analysis request to completion, failure or cancellation.
    pub async fn run(
        &mut self,
        request: AnalysisRequest,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClassifiedError> {
        let trace_id = new_trace_id();
        let started = Instant::now();
        let mut reporter = ProgressReporter::new(progress, cancel);

        self.state = RunState::Validating;
        let result = match validate_request(&request) {
            Ok(()) => {
                let body = generate_content_body(&request.prompt_text, &request.images);
                self.execute(&trace_id, Operation::ImageAnalysis, &body, &mut reporter, cancel)
                    .await
            },
            Err(error) => Err(error),
        };
        let result = result.map(|(content, model)| AnalysisResult {
            content,
            model,
            image_count: request.images.len(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        });

        self.finish(&trace_id, Operation::ImageAnalysis, started, result.as_ref().map(|r| r.model.as_str()));
        result
    }

    /// Generate a user persona around `keyword` (text-only request).
    pub async fn generate_persona(
        &mut self,
        keyword: &str,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<String, ClassifiedError> {
        let trace_id = new_trace_id();
        let started = Instant::now();
        let mut reporter = ProgressReporter::new(progress, cancel);

        self.state = RunState::Validating;
        let result = match validate_persona_keyword(keyword) {
            Ok(keyword) => {
                let body = generate_content_body(&build_persona_prompt(keyword), &[]);
                self.execute(&trace_id, Operation::PersonaGeneration, &body, &mut reporter, cancel)
                    .await
            },
            Err(error) => Err(error),
        };

        self.finish(
            &trace_id,
            Operation::PersonaGeneration,
            started,
            result.as_ref().map(|(_, model)| model.as_str()),
        );
        result.map(|(content, _)| content)
    }

    fn finish(
        &mut self,
        trace_id: &str,
        op: Operation,
        started: Instant,
        outcome: Result<&str, &ClassifiedError>,
    ) {
        match outcome {
            Ok(model) => {
                self.state = RunState::Succeeded;
                tracing::info!(
                    "[{}] {} succeeded on {} in {:?}",
                    trace_id,
                    op.label(),
                    model,
                    started.elapsed()
                );
            },
            Err(error) => {
                self.state = RunState::Failed(error.kind());
                tracing::warn!(
                    "[{}] {} failed after {:?}: {} ({})",
                    trace_id,
                    op.label(),
                    started.elapsed(),
                    error.code(),
                    mask_sensitive_info(error.internal_message())
                );
            },
        }
    }

    /// Everything after local validation: session key, model assurance and
    /// the attempt loop. Returns the text and the model that produced it.
    async fn execute(
        &mut self,
        trace_id: &str,
        op: Operation,
        body: &Value,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<(String, String), ClassifiedError> {
        if cancel.is_cancelled() {
            return Err(ClassifiedError::cancelled());
        }
        let api_key = self.session_key()?;

        self.state = RunState::EnsuringModel;
        reporter.emit("Checking available model...", 0, 0);
        let preferred = self.models.selected_model().to_string();
        let selector = ModelSelector::new(&self.catalog, &self.probe);
        let model = selector
            .ensure_working_model(&mut self.models, Some(&preferred), &api_key, cancel)
            .await?;
        tracing::debug!("[{}] {} using model {}", trace_id, op.label(), model);

        self.attempt_loop(trace_id, op, body, model, &api_key, reporter, cancel).await
    }

    /// Current key from the session, after applying idle expiry.
    ///
    /// A key change since the last run (expiry, logout, new key) drops the
    /// confirmed model before anything else happens.
    fn session_key(&mut self) -> Result<String, ClassifiedError> {
        let expired = self.session.expire_if_idle();
        let generation = self.session.generation();
        if generation != self.key_generation {
            self.models.invalidate();
            self.key_generation = generation;
        }
        if expired {
            return Err(ClassifiedError::with_user_message(
                ErrorKind::AuthInvalid,
                "session expired after idle timeout",
                "Your session has expired. Please enter your API key again.",
            ));
        }
        let api_key = self
            .session
            .api_key()
            .ok_or_else(|| ClassifiedError::new(ErrorKind::AuthInvalid, "no API key in session"))?;
        self.session.touch();
        Ok(api_key)
    }

    #[allow(clippy::too_many_arguments)]
    async fn attempt_loop(
        &mut self,
        trace_id: &str,
        op: Operation,
        body: &Value,
        mut model: String,
        api_key: &str,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationToken,
    ) -> Result<(String, String), ClassifiedError> {
        let mut attempt: u32 = 0;

        loop {
            self.state = RunState::Attempting { attempt };
            let message = if attempt == 0 {
                format!("Requesting {}...", op.label())
            } else {
                format!("Retrying {}... ({}/{})", op.label(), attempt, self.policy.max_retries())
            };
            reporter.emit(message, self.policy.progress_for(attempt), attempt);

            let timeout = self.policy.timeout_for(attempt);
            let url = generate_content_url(&self.config.base_url, &model, api_key);
            tracing::info!(
                "[{}] {} attempt {}/{} on {} (timeout {:?})",
                trace_id,
                op.label(),
                attempt + 1,
                self.policy.max_attempts(),
                model,
                timeout
            );

            let outcome =
                post_with_deadline(self.transport.as_ref(), &url, body, timeout, cancel).await?;
            let failure = match outcome {
                Ok(response) if response.is_success() => match extract_text(&response.body) {
                    Ok(text) => {
                        reporter.emit(op.done_message(), 100, attempt);
                        return Ok((text, model));
                    },
                    Err(detail) => RawFailure::EmptyResponse { detail },
                },
                Ok(response) => RawFailure::http(response.status, response.body),
                Err(error) => RawFailure::NoResponse(error),
            };

            let error = classify(&failure);
            tracing::warn!(
                "[{}] Attempt {} on {} failed: {} ({})",
                trace_id,
                attempt + 1,
                model,
                error.code(),
                error.internal_message()
            );

            if error.kind() == ErrorKind::QuotaExceeded {
                let controller = FallbackController::new(&self.catalog, &self.probe);
                if let Some(notice) =
                    controller.try_switch(&mut self.models, &model, &error, api_key, cancel).await?
                {
                    tracing::info!("[{}] {}", trace_id, notice.reason);
                    if let Some(sink) = &self.fallback_sink {
                        sink.on_fallback(&notice);
                    }
                    model = notice.to_model;
                    continue;
                }
            }

            if let RawFailure::NoResponse(transport_error) = &failure {
                if transport_error.is_unreachable() {
                    let quality = check_connectivity(
                        self.transport.as_ref(),
                        &self.config.base_url,
                        api_key,
                        self.policy.connectivity_timeout(),
                        cancel,
                    )
                    .await?;
                    if !quality.is_connected {
                        tracing::error!("[{}] Host unreachable, giving up", trace_id);
                        return Err(ClassifiedError::new(
                            ErrorKind::NetworkError,
                            format!("host unreachable: {}", error.internal_message()),
                        ));
                    }
                }
            }

            match self.policy.decide(error.kind(), attempt) {
                RetryDecision::Stop => return Err(error),
                RetryDecision::RetryAfter(delay) => {
                    let reason = match error.kind() {
                        ErrorKind::NetworkError | ErrorKind::Timeout => "Connection issue",
                        ErrorKind::QuotaExceeded => "Quota exceeded",
                        _ => "Server error",
                    };
                    reporter.emit(
                        format!("{reason}, retrying in {}s...", format_delay_secs(delay)),
                        self.policy.progress_for(attempt),
                        attempt,
                    );
                    tracing::info!("[{}] Waiting {:?} before retry", trace_id, delay);
                    sleep_or_cancel(delay, cancel).await?;
                    attempt += 1;
                },
            }
        }
    }
}
