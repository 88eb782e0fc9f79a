use std::time::Duration;

/// Delay policy between subscription attempts.
///
/// The subscriber never gives up; a strategy only decides how long to wait
/// before attempt `attempt` (1-based count of consecutive failures).
pub trait RetryStrategy: Send + Sync {
    fn next_delay(&mut self, attempt: u32) -> Duration;
}

/// Same delay before every attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub const DEFAULT: Duration = Duration::from_secs(4);
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl RetryStrategy for FixedDelay {
    fn next_delay(&mut self, _attempt: u32) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delay_never_grows() {
        let mut strategy = FixedDelay::default();
        for attempt in [1, 2, 10, u32::MAX] {
            assert_eq!(strategy.next_delay(attempt), Duration::from_secs(4));
        }
    }
}
