//! Report emission boundary.

use std::sync::{Mutex, PoisonError};

/// Where a report line lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Normal output: progress lines.
    Out,
    /// Error output: retry warnings and terminal errors.
    Err,
}

/// Sink for user-visible report lines.
///
/// Implementations append exactly one newline per call; callers never pass
/// embedded newlines, and never concatenate multiple reports into one call.
pub trait ReportSink: Send + Sync {
    /// Progress line on the normal-output channel.
    fn progress(&self, line: &str);

    /// Retry-warning line on the error channel.
    fn warning(&self, line: &str);

    /// Terminal-error line on the error channel.
    fn error(&self, line: &str);
}

/// Writes progress to stdout, warnings and errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn progress(&self, line: &str) {
        println!("{line}");
    }

    fn warning(&self, line: &str) {
        eprintln!("{line}");
    }

    fn error(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Collects lines in memory, preserving emission order across channels.
/// Used by tests and by embedders that surface reports through their own UI.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Channel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines in emission order.
    pub fn lines(&self) -> Vec<(Channel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines emitted on one channel, in order.
    pub fn on(&self, channel: Channel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line)
            .collect()
    }

    fn push(&self, channel: Channel, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, line.to_string()));
    }
}

impl ReportSink for MemorySink {
    fn progress(&self, line: &str) {
        self.push(Channel::Out, line);
    }

    fn warning(&self, line: &str) {
        self.push(Channel::Err, line);
    }

    fn error(&self, line: &str) {
        self.push(Channel::Err, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_preserves_order_and_channels() {
        let sink = MemorySink::new();
        sink.progress("fetching");
        sink.warning("retrying");
        sink.error("gave up");

        assert_eq!(sink.on(Channel::Out), vec!["fetching".to_string()]);
        assert_eq!(
            sink.on(Channel::Err),
            vec!["retrying".to_string(), "gave up".to_string()]
        );
        assert_eq!(sink.lines().len(), 3);
    }
}
