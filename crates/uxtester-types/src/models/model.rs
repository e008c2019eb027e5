//! Model catalog entries.

use serde::Serialize;

/// Relative response speed of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedClass {
    Fast,
    Medium,
    Slow,
}

/// Relative cost of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostClass {
    Low,
    Medium,
    High,
}

/// A candidate model and its display metadata.
///
/// Descriptors are compile-time constants; the order of the catalog that
/// holds them is the fallback priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Provider model identifier (stable, unique within a catalog)
    pub id: &'static str,
    /// Human-readable name used in fallback notices
    pub display_name: &'static str,
    /// Short description for model pickers
    pub description: &'static str,
    pub speed: SpeedClass,
    pub cost: CostClass,
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}
