use std::time::Duration;

/// Timing parameters shared by both lane kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneConfig {
    /// How often a waiting request re-checks the busy flag.
    pub poll_interval: Duration,
    /// Debounce before a state-lane waiter submits.
    pub settle_delay: Duration,
    /// Pause before a credential-lane waiter submits.
    pub cooldown: Duration,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            settle_delay: Duration::from_secs(10),
            cooldown: Duration::from_secs(300),
        }
    }
}
