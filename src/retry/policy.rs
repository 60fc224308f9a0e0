use backon::{BackoffBuilder, ExponentialBuilder};
use docproxy_client::ClientError;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{Outcome, Sleeper};
use crate::config::RetryConfig;
use crate::error::IsRetryable;

/// Decides whether a failed attempt should be retried.
pub type TransientPredicate = fn(&ClientError) -> bool;

/// Bounded exponential retry: `max_attempts` calls, sleeping
/// `base_delay * factor^i` after the `i`-th transient failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    factor: f32,
    is_transient: TransientPredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            factor: 2.0,
            is_transient: <ClientError as IsRetryable>::is_retryable,
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.base_delay_ms))
            .with_factor(cfg.factor)
    }

    #[must_use]
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor.max(1.0);
        self
    }

    #[must_use]
    pub fn with_transient_predicate(mut self, predicate: TransientPredicate) -> Self {
        self.is_transient = predicate;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn is_transient(&self, err: &ClientError) -> bool {
        (self.is_transient)(err)
    }

    /// Delay slept after the failure of attempt `attempt` (zero-based), or
    /// `None` past the last attempt. Read from [`RetryPolicy::schedule`].
    pub fn delay_for(&self, attempt: usize) -> Option<Duration> {
        self.schedule().nth(attempt)
    }

    /// One delay per attempt, in order.
    ///
    /// backon multiplies in `f32`, so bases that are not whole seconds can
    /// drift by a few nanoseconds per step (100ms x2 gives 200.000003ms).
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.delay_cap())
            .with_factor(self.factor)
            .with_max_times(self.max_attempts)
            .build()
    }

    /// Upper bound handed to backon: `base_delay * factor^(max_attempts - 1)`,
    /// computed in `f64` so it never clips the last step of the schedule.
    fn delay_cap(&self) -> Duration {
        let exponent = i32::try_from(self.max_attempts - 1).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * f64::from(self.factor).powi(exponent);
        Duration::try_from_secs_f64(secs * 1.001).unwrap_or(Duration::MAX)
    }

    /// Worst-case time spent sleeping for one call.
    pub fn total_delay(&self) -> Duration {
        self.schedule().sum()
    }

    /// Runs `op` under this policy.
    ///
    /// Transient failures are logged, slept on and retried. Any other error is
    /// returned unchanged on the spot. When the last attempt also fails
    /// transiently the call ends in [`Outcome::Exhausted`] instead of an error.
    pub fn execute<T, F>(
        &self,
        operation: &str,
        sleeper: &dyn Sleeper,
        mut op: F,
    ) -> Result<Outcome<T>, ClientError>
    where
        F: FnMut() -> Result<T, ClientError>,
    {
        let mut last_error = None;

        for (attempt, delay) in self.schedule().enumerate() {
            match op() {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt, "Operation succeeded after retry");
                    }
                    return Ok(Outcome::Success(value));
                }
                Err(err) if self.is_transient(&err) => {
                    info!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Transient disconnect, retrying operation"
                    );
                    sleeper.sleep(delay);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        let Some(last_error) = last_error else {
            // Unreachable with max_attempts >= 1; fall back to a single plain call.
            return op().map(Outcome::Success);
        };

        error!(
            operation,
            attempts = self.max_attempts,
            error = %last_error,
            "Operation permanently failed after exhausting retries"
        );

        Ok(Outcome::Exhausted {
            operation: operation.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RecordingSleeper;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_secs).collect()
    }

    #[test]
    fn default_schedule_doubles_from_one_second() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.schedule().collect::<Vec<_>>(), secs(&[1, 2, 4, 8, 16]));
        assert_eq!(policy.total_delay(), Duration::from_secs(31));
    }

    #[test]
    fn invalid_config_values_are_clamped() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            base_delay_ms: 1000,
            factor: 0.5,
        });

        assert_eq!(policy.max_attempts(), 1);
        assert!((policy.factor() - 1.0).abs() < f32::EPSILON);
        assert_eq!(policy.schedule().collect::<Vec<_>>(), secs(&[1]));
    }

    #[test]
    fn delay_for_matches_schedule() {
        let policy = RetryPolicy::new(4, Duration::from_secs(1)).with_factor(3.0);
        let expected: Vec<_> = (0..4).filter_map(|i| policy.delay_for(i)).collect();

        assert_eq!(policy.schedule().collect::<Vec<_>>(), expected);
        assert_eq!(expected, secs(&[1, 3, 9, 27]));
        assert_eq!(policy.delay_for(4), None);
    }

    #[test]
    fn fractional_base_stays_consistent_with_schedule() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
            factor: 2.0,
        });
        let schedule: Vec<_> = policy.schedule().collect();

        assert_eq!(policy.base_delay(), Duration::from_millis(100));
        assert_eq!(schedule.len(), 5);
        for (attempt, delay) in schedule.iter().enumerate() {
            assert_eq!(policy.delay_for(attempt), Some(*delay));
            let expected = Duration::from_millis(100 << attempt);
            let drift = delay.abs_diff(expected);
            assert!(drift < Duration::from_micros(1), "attempt {attempt}: {delay:?}");
        }
    }

    #[test]
    fn custom_predicate_controls_retries() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1))
            .with_transient_predicate(|err| matches!(err, ClientError::NotFound(_)));
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;

        let outcome = policy
            .execute("app.users.find", &sleeper, || {
                calls += 1;
                Err::<(), _>(ClientError::NotFound("users".to_string()))
            })
            .expect("exhaustion is not an error");

        assert!(outcome.is_exhausted());
        assert_eq!(calls, 3);
        assert_eq!(sleeper.delays(), secs(&[1, 2, 4]));
    }
}
