//! Retry policy: decides when a transiently failing order is given up.

/// Retry policy for transiently failing entries.
///
/// Entries are retried on every flush pass. There is no per-entry backoff:
/// skipping an entry while delivering the ones behind it would break FIFO
/// delivery order. The only knob is an optional attempt ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Give up after this many failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry on every pass until delivered or manually cleared.
    pub fn indefinite() -> Self {
        Self { max_attempts: None }
    }

    /// Drop an entry once it has failed `max_attempts` times.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Has an entry with `attempts` failed attempts used up its budget?
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts >= max,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_retries_forever() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::indefinite());
        assert!(!policy.is_exhausted(u32::MAX));
    }

    #[test]
    fn ceiling_is_inclusive() {
        let policy = RetryPolicy::with_max_attempts(3);
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
        assert!(policy.is_exhausted(4));
    }

    #[test]
    fn zero_ceiling_is_clamped_to_one() {
        let policy = RetryPolicy::with_max_attempts(0);
        assert_eq!(policy.max_attempts, Some(1));
    }
}
