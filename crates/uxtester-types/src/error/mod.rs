//! Typed error definitions for UX Tester.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for status snapshots via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

mod classified;
mod config;
mod key;

pub use classified::{ClassifiedError, ErrorKind};
pub use config::ConfigError;
pub use key::KeyError;
