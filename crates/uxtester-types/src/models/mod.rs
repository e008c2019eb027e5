//! Core domain models for UX Tester.
//!
//! This module contains all shared data structures used across the workspace.

mod config;
mod model;
mod progress;
mod request;

// Re-export all models
pub use config::{OrchestratorConfig, RetryConfig, TimeoutConfig};
pub use model::{CostClass, ModelDescriptor, SpeedClass};
pub use progress::{FallbackNotice, ProgressEvent};
pub use request::{AnalysisRequest, AnalysisResult, ImageLimits, ImagePart};
