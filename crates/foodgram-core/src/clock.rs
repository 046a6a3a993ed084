//! Clock abstraction for determinism.
//!
//! Everything time-dependent reads the time through [`Clock`]: expiry in
//! [`TtlCache`](crate::cache::TtlCache), recipe `pub_date`, `date_joined` on
//! registration, and auth token issue times. Tests swap in a manual clock and
//! advance it instead of sleeping.

use chrono::{DateTime, Utc};

/// Source of the current time for cache expiry and record timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
