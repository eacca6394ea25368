//! Injectable time source.
//!
//! Token expiry is always computed against a [`Clock`], never against the
//! system time directly.

use chrono::{DateTime, Utc};

/// Time source trait
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn is_expired(clock: &dyn Clock, expires_at: DateTime<Utc>) -> bool {
///     expires_at <= clock.now()
/// }
/// ```
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
