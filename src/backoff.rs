//! Delay schedules for retry policies.
//!
//! Attempt semantics: attempt index `0` is the initial call and always maps to
//! zero delay; retries start at `attempt = 1`. The linear schedule is the crate
//! default: the delay before retry `n` is `base * n`, i.e. the wait after the
//! i-th failed attempt (0-indexed) is `base * (1 + i)`. Constant and
//! exponential schedules are available for call sites with different provider
//! characteristics. All computations saturate at [`MAX_BACKOFF`] instead of
//! overflowing.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use diehard::Backoff;
//!
//! let backoff = Backoff::linear(Duration::from_secs(1));
//! assert_eq!(backoff.delay(0), Duration::ZERO); // initial call
//! assert_eq!(backoff.delay(1), Duration::from_secs(1));
//! assert_eq!(backoff.delay(2), Duration::from_secs(2));
//! ```

use std::time::Duration;
use thiserror::Error;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors returned by backoff configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackoffError {
    #[error("with_max is only valid for linear or exponential backoff")]
    ConstantDoesNotSupportMax,
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Schedule {
    Constant { delay: Duration },
    Linear { base: Duration, max: Option<Duration> },
    Exponential { base: Duration, max: Option<Duration> },
}

/// A delay schedule: constant, linear, or exponential in the attempt index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    schedule: Schedule,
}

impl Backoff {
    /// Same delay before every retry.
    pub fn constant(delay: Duration) -> Self {
        Self { schedule: Schedule::Constant { delay } }
    }

    /// Delay grows linearly: `base * attempt`.
    pub fn linear(base: Duration) -> Self {
        Self { schedule: Schedule::Linear { base, max: None } }
    }

    /// Delay doubles each retry: `base * 2^(attempt - 1)`.
    pub fn exponential(base: Duration) -> Self {
        Self { schedule: Schedule::Exponential { base, max: None } }
    }

    /// Cap the delay for a linear or exponential schedule.
    ///
    /// Errors on `Constant`, on a zero `max`, or when `max < base`.
    pub fn with_max(mut self, max: Duration) -> Result<Self, BackoffError> {
        if max.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match &mut self.schedule {
            Schedule::Constant { .. } => Err(BackoffError::ConstantDoesNotSupportMax),
            Schedule::Linear { base, max: cap } | Schedule::Exponential { base, max: cap } => {
                if max < *base {
                    return Err(BackoffError::MaxLessThanBase { base: *base, max });
                }
                *cap = Some(max);
                Ok(self)
            }
        }
    }

    /// Delay for a given attempt index (0-based; 0 = initial call, no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match &self.schedule {
            Schedule::Constant { delay } => *delay,
            Schedule::Linear { base, max } => {
                let attempt = attempt.min(u32::MAX as usize) as u32; // clamp before multiply
                let raw = base.checked_mul(attempt).unwrap_or(MAX_BACKOFF);
                cap(raw, *max)
            }
            Schedule::Exponential { base, max } => {
                let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
                let multiplier = 2u128.saturating_pow(exponent);
                let nanos = base.as_nanos().saturating_mul(multiplier);
                let raw = Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64);
                cap(raw, *max)
            }
        }
    }
}

fn cap(delay: Duration, max: Option<Duration>) -> Duration {
    max.map_or(delay, |m| delay.min(m)).min(MAX_BACKOFF)
}
