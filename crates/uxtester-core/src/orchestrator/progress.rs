//! Progress and fallback sinks.

use tokio_util::sync::CancellationToken;
use uxtester_types::{FallbackNotice, ProgressEvent};

/// Receives progress events of one run, synchronously and in order.
///
/// Called on the resume path of every suspension point, so implementations
/// must not block.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent) + Send,
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}

/// Receives one notice per successful model switch.
pub trait FallbackSink: Send + Sync {
    fn on_fallback(&self, notice: &FallbackNotice);
}

impl<F> FallbackSink for F
where
    F: Fn(&FallbackNotice) + Send + Sync,
{
    fn on_fallback(&self, notice: &FallbackNotice) {
        self(notice);
    }
}

/// Wraps the caller's sink for one run.
///
/// Percent never goes backwards, and nothing is delivered once the run's
/// token is cancelled.
pub(crate) struct ProgressReporter<'a> {
    sink: &'a mut dyn ProgressSink,
    cancel: &'a CancellationToken,
    last_percent: u8,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, cancel: &'a CancellationToken) -> Self {
        Self { sink, cancel, last_percent: 0 }
    }

    pub(crate) fn emit(&mut self, message: impl Into<String>, percent: u8, retry_attempt: u32) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.last_percent = self.last_percent.max(percent.min(100));
        let event = ProgressEvent::new(message, self.last_percent, retry_attempt);
        self.sink.on_progress(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped_to_previous_maximum() {
        let mut seen = Vec::new();
        let cancel = CancellationToken::new();
        {
            let mut sink = |e: &ProgressEvent| seen.push(e.percent);
            let mut reporter = ProgressReporter::new(&mut sink, &cancel);
            reporter.emit("a", 25, 0);
            reporter.emit("b", 12, 1);
            reporter.emit("c", 200, 1);
        }
        assert_eq!(seen, vec![25, 25, 100]);
    }

    #[test]
    fn nothing_is_emitted_after_cancellation() {
        let mut seen = Vec::new();
        let cancel = CancellationToken::new();
        {
            let mut sink = |e: &ProgressEvent| seen.push(e.message.clone());
            let mut reporter = ProgressReporter::new(&mut sink, &cancel);
            reporter.emit("before", 0, 0);
            cancel.cancel();
            reporter.emit("after", 10, 0);
        }
        assert_eq!(seen, vec!["before".to_string()]);
    }
}
