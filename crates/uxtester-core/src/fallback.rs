//! Quota-triggered model fallback.
//!
//! Switching only moves forward through the catalog, so the number of
//! switches in one run is bounded by the catalog length.

use crate::catalog::ModelCatalog;
use crate::probe::ModelProbe;
use crate::selector::SessionModelState;
use tokio_util::sync::CancellationToken;
use uxtester_types::{ClassifiedError, ErrorKind, FallbackNotice};

pub struct FallbackController<'a> {
    catalog: &'a ModelCatalog,
    probe: &'a ModelProbe,
}

impl<'a> FallbackController<'a> {
    pub fn new(catalog: &'a ModelCatalog, probe: &'a ModelProbe) -> Self {
        Self { catalog, probe }
    }

    /// Try to replace `current` after `error`.
    ///
    /// Only `QuotaExceeded` triggers a switch. Returns the notice for the
    /// switch, or `None` when no later candidate passes probing. `Err` only
    /// on cancellation.
    pub async fn try_switch(
        &self,
        state: &mut SessionModelState,
        current: &str,
        error: &ClassifiedError,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<FallbackNotice>, ClassifiedError> {
        if error.kind() != ErrorKind::QuotaExceeded {
            return Ok(None);
        }

        for candidate in self.catalog.after(current) {
            if self.probe.probe(candidate.id, api_key, cancel).await? {
                state.confirm(candidate.id);
                let notice = FallbackNotice {
                    from_model: current.to_string(),
                    to_model: candidate.id.to_string(),
                    reason: fallback_reason(self.catalog, current, candidate.id),
                };
                tracing::warn!("Model fallback: {} -> {}", current, candidate.id);
                return Ok(Some(notice));
            }
        }

        tracing::warn!("No fallback model available after {}", current);
        Ok(None)
    }
}

fn fallback_reason(catalog: &ModelCatalog, from: &str, to: &str) -> String {
    format!(
        "{} quota exceeded, switched to {}",
        catalog.display_name(from),
        catalog.display_name(to)
    )
}
