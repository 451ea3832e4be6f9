//! Optional randomization of retry delays.
//!
//! The default is [`Jitter::None`], which leaves the backoff schedule exact and
//! deterministic. `Full` and `Equal` spread delays to avoid synchronized retry
//! storms when many invocations fail at once. Millisecond conversions saturate
//! to `u64::MAX` on very large durations.

use rand::{rng, Rng};
use std::time::Duration;

/// Jitter strategy applied to each computed backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Use the exact backoff delay.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay/2, delay]`, keeping a floor under the wait.
    Equal,
}

impl Jitter {
    /// Apply jitter to a delay using the thread-local RNG.
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Apply jitter with a caller-provided RNG (for deterministic tests).
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        let millis = delay.as_millis().try_into().unwrap_or(u64::MAX);
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
            Jitter::Equal => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(millis / 2..=millis))
            }
        }
    }
}
