use std::time::Duration;

/// Bounds for the two polling loops of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// How many times to look for the freshly dispatched run.
    pub discovery_attempts: u32,
    /// Pause between two run-id lookups.
    pub discovery_interval: Duration,
    /// Deadline for the run to reach `completed`, measured from the first status poll.
    pub timeout: Duration,
    /// Pause between two status polls.
    pub poll_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            discovery_attempts: 30,
            discovery_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(1800),
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl PollPolicy {
    /// Same attempt counts and deadline, no waiting in between.
    pub fn immediate(timeout: Duration) -> Self {
        Self {
            discovery_interval: Duration::ZERO,
            poll_interval: Duration::ZERO,
            timeout,
            ..Self::default()
        }
    }
}
