//! # UX Tester Types
//!
//! Core types, models, and error definitions for UX Tester.
//!
//! This crate provides the foundational type system for the UX Tester workspace:
//!
//! - **`error`** - Error taxonomy for classified request failures, key storage and configuration
//! - **`models`** - Domain models (model catalog entries, analysis requests, progress, config)
//!
//! ## Architecture Role
//!
//! `uxtester-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!        uxtester-types (this crate)
//!                │
//!                ▼
//!          uxtester-core
//!                │
//!                ▼
//!          uxtester-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for status snapshots and logs
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ClassifiedError, ConfigError, ErrorKind, KeyError};

// Re-export core model types
pub use models::{
    AnalysisRequest, AnalysisResult, CostClass, FallbackNotice, ImageLimits, ImagePart,
    ModelDescriptor, OrchestratorConfig, ProgressEvent, RetryConfig, SpeedClass, TimeoutConfig,
};
