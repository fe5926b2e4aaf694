//! Status reporting
//!
//! The pipeline reports progress through a [`StatusSink`]: transient status
//! text while a phase runs, one-shot notices on completion, and warnings
//! for non-fatal anomalies. All methods are fire-and-forget; the pipeline
//! never consumes a return value.

/// Sink for pipeline progress and notices
pub trait StatusSink: Send + Sync {
    /// Replace the transient status text. An empty string clears it.
    fn set_status(&self, text: &str);

    /// Show a one-shot completion or informational message.
    fn notify(&self, message: &str);

    /// Show a non-fatal warning.
    fn warn(&self, message: &str);
}

/// Sink that prints to the console: status and warnings to stderr,
/// notices to stdout.
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn set_status(&self, text: &str) {
        if !text.is_empty() {
            eprintln!("{}", text);
        }
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }
}

/// Sink that discards everything. Useful in tests and embedding.
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn set_status(&self, _text: &str) {}
    fn notify(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}
