//! Progress side channel
//!
//! The batch corrector reports its log lines and per-frame completion
//! ticks through this observer, keeping the core headless. The ticks are
//! UI feedback only and carry no correctness weight.

pub trait ProgressObserver {
    /// One human-readable log line.
    fn on_log(&mut self, line: &str);

    /// Completion tick after each frame: `current` out of `total`.
    fn on_progress(&mut self, current: usize, total: usize);
}

/// Observer that discards everything.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_log(&mut self, _line: &str) {}
    fn on_progress(&mut self, _current: usize, _total: usize) {}
}
