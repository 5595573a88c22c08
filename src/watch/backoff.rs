use std::time::Duration;

use rand::Rng;

use crate::BackoffPolicy;

/// Exponential pause generator for stream reconnects.
///
/// Every [`pause`](Self::pause) returns the current step and advances it by
/// the policy multiplier, capped at the policy maximum. [`reset`](Self::reset)
/// goes back to the initial step.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    jitter: bool,
    current: Duration,
}

impl Backoff {
    pub(crate) fn new(policy: &BackoffPolicy) -> Self {
        let initial = Duration::from_millis(policy.initial_delay_ms);
        let max = Duration::from_millis(policy.max_delay_ms).max(initial);
        Self {
            initial,
            max,
            // NaN collapses to 1.0; infinity saturates in `pause`
            multiplier: policy.multiplier.max(1.0),
            jitter: policy.jitter,
            current: initial,
        }
    }

    pub(crate) fn pause(&mut self) -> Duration {
        let step = self.current;
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.multiplier)
            .map_or(self.max, |next| next.min(self.max));

        if self.jitter && step > self.initial {
            rand::thread_rng().gen_range(self.initial..=step)
        } else {
            step
        }
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.initial;
    }

    pub(crate) fn max(&self) -> Duration {
        self.max
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Duration {
        self.current
    }
}
