use std::io::Write;

/// Audible confirmation when a task is completed. Fire-and-forget: an
/// implementation must never fail the caller.
pub trait Feedback: Send + Sync {
    fn play_success_sound(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn play_success_sound(&self) {}
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Feedback for TerminalBell {
    fn play_success_sound(&self) {
        let mut stderr = std::io::stderr();
        if stderr.write_all(b"\x07").and_then(|_| stderr.flush()).is_err() {
            tracing::debug!("terminal bell unavailable");
        }
    }
}
