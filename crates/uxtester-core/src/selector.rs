//! Working-model assurance.
//!
//! [`SessionModelState`] separates what the user asked for (`selected`) from
//! what was last confirmed to work (`active`). Only [`ModelSelector`] and the
//! fallback controller confirm a model; any change of selection drops the
//! confirmation.

use crate::catalog::ModelCatalog;
use crate::probe::ModelProbe;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uxtester_types::ClassifiedError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionModelState {
    selected_model: String,
    active_model: Option<String>,
}

impl SessionModelState {
    pub fn new(selected_model: impl Into<String>) -> Self {
        Self { selected_model: selected_model.into(), active_model: None }
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    /// Change the user's selection. A different model clears the confirmation.
    pub fn select(&mut self, model: impl Into<String>) {
        let model = model.into();
        if model != self.selected_model {
            self.selected_model = model;
            self.active_model = None;
        }
    }

    pub(crate) fn confirm(&mut self, model: &str) {
        self.active_model = Some(model.to_string());
    }

    /// Forget the confirmed model (key change, logout, failed re-probe).
    pub fn invalidate(&mut self) {
        self.active_model = None;
    }
}

pub struct ModelSelector<'a> {
    catalog: &'a ModelCatalog,
    probe: &'a ModelProbe,
}

impl<'a> ModelSelector<'a> {
    pub fn new(catalog: &'a ModelCatalog, probe: &'a ModelProbe) -> Self {
        Self { catalog, probe }
    }

    /// Return a model confirmed to work with `api_key`.
    ///
    /// Order: the cached active model, then `preferred`, then the catalog in
    /// priority order. Each candidate is probed at most once per call.
    pub async fn ensure_working_model(
        &self,
        state: &mut SessionModelState,
        preferred: Option<&str>,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ClassifiedError> {
        let mut tried: Vec<String> = Vec::new();

        if let Some(active) = state.active_model().map(str::to_string) {
            if self.probe.probe(&active, api_key, cancel).await? {
                return Ok(active);
            }
            tracing::warn!("Active model {} failed re-probe, searching again", active);
            state.invalidate();
            tried.push(active);
        }

        if let Some(preferred) = preferred {
            if !tried.iter().any(|t| t == preferred) {
                if self.probe.probe(preferred, api_key, cancel).await? {
                    state.confirm(preferred);
                    tracing::info!("Using preferred model {}", preferred);
                    return Ok(preferred.to_string());
                }
                tried.push(preferred.to_string());
            }
        }

        for model in self.catalog.models() {
            if tried.iter().any(|t| t == model.id) {
                continue;
            }
            if self.probe.probe(model.id, api_key, cancel).await? {
                state.confirm(model.id);
                tracing::info!("Found working model {}", model);
                return Ok(model.id.to_string());
            }
            tried.push(model.id.to_string());
        }

        tracing::error!("No working model after probing {} candidate(s)", tried.len());
        Err(ClassifiedError::no_working_model(tried.len()))
    }
}
