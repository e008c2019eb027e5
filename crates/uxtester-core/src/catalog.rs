//! Model catalog — ordered registry of candidate Gemini models.
//!
//! Order is priority: the first entry is the preferred default, later entries
//! are fallback targets. Fallback only ever moves forward through this list.

use uxtester_types::{CostClass, ModelDescriptor, SpeedClass};

/// Built-in Gemini candidates in priority order.
pub const GEMINI_MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: "gemini-2.5-flash",
        display_name: "Gemini 2.5 Flash",
        description: "Fast and efficient analysis (recommended)",
        speed: SpeedClass::Fast,
        cost: CostClass::Low,
    },
    ModelDescriptor {
        id: "gemini-2.5-pro",
        display_name: "Gemini 2.5 Pro",
        description: "High-quality detailed analysis",
        speed: SpeedClass::Medium,
        cost: CostClass::High,
    },
    ModelDescriptor {
        id: "gemini-1.5-flash",
        display_name: "Gemini 1.5 Flash",
        description: "Previous generation Flash",
        speed: SpeedClass::Fast,
        cost: CostClass::Low,
    },
    ModelDescriptor {
        id: "gemini-1.5-pro",
        display_name: "Gemini 1.5 Pro",
        description: "Previous generation Pro",
        speed: SpeedClass::Medium,
        cost: CostClass::High,
    },
];

/// Static, ordered set of model descriptors.
#[derive(Debug, Clone, Copy)]
pub struct ModelCatalog {
    models: &'static [ModelDescriptor],
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(GEMINI_MODELS)
    }
}

impl ModelCatalog {
    pub const fn new(models: &'static [ModelDescriptor]) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &'static [ModelDescriptor] {
        self.models
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> {
        self.models.iter().map(|m| m.id)
    }

    pub fn get(&self, id: &str) -> Option<&'static ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.models.iter().position(|m| m.id == id)
    }

    /// Candidates strictly after `id`, in priority order.
    ///
    /// Empty when `id` is not catalogued or is the last entry.
    pub fn after(&self, id: &str) -> &'static [ModelDescriptor] {
        match self.position(id) {
            Some(index) => &self.models[index + 1..],
            None => &[],
        }
    }

    /// Display name for `id`, or the id itself for uncatalogued models.
    pub fn display_name<'a>(&self, id: &'a str) -> &'a str {
        match self.get(id) {
            Some(model) => model.display_name,
            None => id,
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
