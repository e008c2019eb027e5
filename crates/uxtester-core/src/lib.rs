//! # UX Tester Core
//!
//! Resilient orchestration of Gemini `generateContent` calls for UX critiques.
//!
//! ```text
//! uxtester-core/src/
//! ├── catalog.rs        # ordered candidate models
//! ├── retry/            # backoff, per-attempt timeouts, progress share
//! ├── classifier.rs     # raw failure -> ClassifiedError
//! ├── transport/        # Transport trait, reqwest impl, Gemini wire format
//! ├── probe.rs          # short (key, model) checks
//! ├── selector.rs       # working-model assurance
//! ├── fallback.rs       # quota-triggered forward-only switching
//! ├── orchestrator/     # state machine, attempt loop, progress
//! ├── session.rs        # key storage and idle expiry
//! ├── prompt.rs         # critique and persona prompts
//! ├── network.rs        # connectivity and latency
//! ├── security.rs       # key format and credential masking
//! ├── config.rs         # file + env configuration
//! └── logger.rs         # tracing setup
//! ```

#![allow(
    clippy::significant_drop_tightening,
    reason = "parking_lot guards are held only for short field updates"
)]
#![allow(clippy::redundant_else, reason = "Explicit else blocks improve readability in control flow")]
#![allow(clippy::map_err_ignore, reason = "Error context is provided in the replacement message")]
#![allow(clippy::needless_continue, reason = "Explicit continue marks the fallback substitution")]
#![allow(
    clippy::derive_partial_eq_without_eq,
    reason = "Some types intentionally don't implement Eq"
)]
// Test-only lints: allow panic!, etc. in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::float_cmp,
        clippy::indexing_slicing,
        clippy::assertions_on_result_states
    )
)]

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod fallback;
pub mod logger;
pub mod network;
pub mod orchestrator;
pub mod probe;
pub mod prompt;
pub mod retry;
pub mod security;
pub mod selector;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use catalog::{ModelCatalog, GEMINI_MODELS};
pub use config::{config_from_env, load_config};
pub use network::{ConnectionQuality, NetworkQuality};
pub use orchestrator::{
    FallbackSink, NoProgress, ProgressSink, RequestOrchestrator, RunState, ServiceStatus,
};
pub use session::{KeyStore, MemoryKeyStore, SessionStore};
pub use transport::{ReqwestTransport, Transport};
pub use uxtester_types as types;
