//! Logging setup and per-run trace ids.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber filtered by `RUST_LOG`, or `default_directive`
/// when unset or unparsable. Logs go to stderr so stdout stays free for results.
pub fn init_logger(default_directive: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Short id used to tag every log line of one run.
pub fn new_trace_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_ids_are_short_and_distinct() {
        let a = new_trace_id();
        let b = new_trace_id();
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
