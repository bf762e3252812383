//! Shared types used by the scheduler subsystem.

use std::time::Duration;

/// Timing knobs of the retry loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pause after every iteration, whichever branch it took.
    pub backoff: Duration,

    /// Delay before a dialog raised during a claim is accepted.
    pub dialog_accept_delay: Duration,

    /// Pause after the loop has stopped, before `run` returns.
    pub final_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            dialog_accept_delay: Duration::from_secs(1),
            final_delay: Duration::from_secs(1),
        }
    }
}
