use serde::Serialize;
use uxtester_types::ErrorKind;

/// Where the orchestrator is in its current (or last) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "details")]
pub enum RunState {
    #[default]
    Idle,
    Validating,
    EnsuringModel,
    /// Inside the attempt loop; `attempt` counts retries charged so far
    Attempting { attempt: u32 },
    Succeeded,
    Failed(ErrorKind),
}

impl RunState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}
