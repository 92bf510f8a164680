use std::time::{Duration, Instant};

/// Samples the monotonic clock at question display and again at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionTimer {
    shown_at: Instant,
}

impl QuestionTimer {
    /// Start timing the question currently on screen.
    #[must_use]
    pub fn start() -> Self {
        Self {
            shown_at: Instant::now(),
        }
    }

    #[must_use]
    pub const fn started_at(shown_at: Instant) -> Self {
        Self { shown_at }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.shown_at.elapsed()
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
