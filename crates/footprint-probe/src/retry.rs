//! Per-URL retry state machine and backoff schedule.
//!
//! ```text
//! Pending -> Attempting(1) -> Success
//!                          -> RetryWait(2, d1) -> Attempting(2) -> ...
//!                          -> Exhausted
//! ```
//!
//! Delays are local to one URL; nothing here is shared between workers.

use std::time::Duration;

use rand::Rng;

use crate::error::{ProbeError, ProbeResult};
use crate::types::ProbeConfig;

/// Smallest base delay. Delays are scheduled in whole milliseconds, so a
/// shorter base would collapse the first steps of the schedule.
const MIN_BASE: Duration = Duration::from_millis(1);

/// Exponential backoff: `base * 2^(failed - 1)` before the next attempt.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    jitter: bool,
}

impl Backoff {
    /// `base` is floored at one millisecond.
    pub fn new(base: Duration) -> Self {
        Self {
            base: base.max(MIN_BASE),
            jitter: false,
        }
    }

    /// Apply a ±10% multiplicative jitter. `2 * 0.9 > 1.1`, so the jittered
    /// schedule keeps strictly increasing delays.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay after `failed` attempts, without jitter.
    pub fn nominal(&self, failed: u32) -> Duration {
        let shift = failed.saturating_sub(1).min(31);
        self.base.saturating_mul(1u32 << shift)
    }

    /// Delay after `failed` attempts.
    pub fn delay(&self, failed: u32) -> Duration {
        let nominal = self.nominal(failed);
        if !self.jitter {
            return nominal;
        }
        let factor: f64 = rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
        let jittered_ms = (nominal.as_millis() as f64 * factor).round() as u64;
        Duration::from_millis(jittered_ms.max(1))
    }
}

/// Attempt limit plus backoff schedule.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            config.max_attempts,
            Backoff::new(Duration::from_millis(config.base_delay_ms)).with_jitter(config.jitter),
        )
    }
}

/// State of one URL's probe.
#[derive(Debug)]
pub enum ProbeState {
    Pending,
    Attempting { attempt: u32 },
    RetryWait { next_attempt: u32, delay: Duration },
    Success { size: u64, attempts: u32 },
    Exhausted { attempts: u32, error: ProbeError },
}

impl ProbeState {
    /// Start (or resume after a wait) an attempt.
    pub fn begin(self) -> Self {
        match self {
            Self::Pending => Self::Attempting { attempt: 1 },
            Self::RetryWait { next_attempt, .. } => Self::Attempting {
                attempt: next_attempt,
            },
            other => other,
        }
    }

    /// Fold the outcome of the current attempt into the next state.
    pub fn record(self, result: ProbeResult<u64>, policy: &RetryPolicy) -> Self {
        let Self::Attempting { attempt } = self else {
            return self;
        };

        match result {
            Ok(size) => Self::Success {
                size,
                attempts: attempt,
            },
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                Self::RetryWait {
                    next_attempt: attempt + 1,
                    delay: policy.backoff.delay(attempt),
                }
            }
            Err(error) => Self::Exhausted {
                attempts: attempt,
                error,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Exhausted { .. })
    }

    /// Final outcome. Transient errors that used up every attempt are
    /// wrapped in [`ProbeError::Exhausted`].
    pub fn into_result(self) -> ProbeResult<u64> {
        match self {
            Self::Success { size, .. } => Ok(size),
            Self::Exhausted { attempts, error } if error.is_transient() => {
                Err(ProbeError::Exhausted {
                    attempts,
                    last: Box::new(error),
                })
            }
            Self::Exhausted { error, .. } => Err(error),
            Self::Pending | Self::Attempting { .. } | Self::RetryWait { .. } => {
                Err(ProbeError::Undetermined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> ProbeError {
        ProbeError::Timeout {
            message: "timed out".into(),
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Backoff::new(Duration::from_millis(100)))
    }

    #[test]
    fn test_nominal_schedule_doubles() {
        let backoff = Backoff::new(Duration::from_secs(1));
        assert_eq!(backoff.nominal(1), Duration::from_secs(1));
        assert_eq!(backoff.nominal(2), Duration::from_secs(2));
        assert_eq!(backoff.nominal(3), Duration::from_secs(4));
    }

    #[test]
    fn test_delays_strictly_increase() {
        let plain = Backoff::new(Duration::from_millis(250));
        let jittered = plain.with_jitter(true);
        for _ in 0..200 {
            for failed in 1..8 {
                assert!(plain.delay(failed + 1) > plain.delay(failed));
                assert!(jittered.delay(failed + 1) > jittered.delay(failed));
            }
        }
    }

    #[test]
    fn test_zero_base_still_increases() {
        let zero = Backoff::new(Duration::ZERO);
        assert_eq!(zero.nominal(1), Duration::from_millis(1));

        let jittered = zero.with_jitter(true);
        for _ in 0..200 {
            for failed in 1..6 {
                assert!(jittered.delay(failed + 1) > jittered.delay(failed));
            }
        }

        let policy = RetryPolicy::from_config(&ProbeConfig::default().with_base_delay_ms(0));
        assert!(policy.backoff.delay(2) > policy.backoff.delay(1));
    }

    #[test]
    fn test_success_on_first_attempt() {
        let policy = policy(3);
        let state = ProbeState::Pending.begin().record(Ok(42), &policy);
        assert!(state.is_terminal());
        assert_eq!(state.into_result().unwrap(), 42);
    }

    #[test]
    fn test_transient_failures_walk_through_retry_wait() {
        let policy = policy(3);
        let mut delays = Vec::new();
        let mut state = ProbeState::Pending.begin();

        while !state.is_terminal() {
            state = match state {
                ProbeState::RetryWait { delay, .. } => {
                    delays.push(delay);
                    state.begin()
                }
                ProbeState::Attempting { .. } => state.record(Err(timeout()), &policy),
                other => other,
            };
        }

        assert_eq!(
            delays,
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        match state.into_result() {
            Err(ProbeError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, ProbeError::Timeout { .. }));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_error_stops_immediately() {
        let policy = policy(3);
        let state = ProbeState::Pending
            .begin()
            .record(Err(ProbeError::Undetermined), &policy);
        assert!(matches!(state, ProbeState::Exhausted { attempts: 1, .. }));
        assert!(matches!(
            state.into_result(),
            Err(ProbeError::Undetermined)
        ));
    }

    #[test]
    fn test_recovery_after_retry() {
        let policy = policy(3);
        let state = ProbeState::Pending
            .begin()
            .record(Err(timeout()), &policy)
            .begin()
            .record(Ok(7), &policy);
        assert!(matches!(state, ProbeState::Success { size: 7, attempts: 2 }));
    }
}
