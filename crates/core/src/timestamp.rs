//! Instant type for stored creation times
//!
//! Entities stamp auto-now fields with a `Timestamp` at creation. The type is
//! a microsecond count since the Unix epoch, totally ordered so multi-link
//! collections can be sorted by time.
//!
//! A `Timestamp` is deliberately not a `Value`: it has no native wire
//! representation. Projection reaches it only through a `_serial` summary
//! field rendering [`Timestamp::to_rfc3339`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Microseconds since the Unix epoch
///
/// Ordering follows the underlying count, so `t1 < t2` means `t1` happened
/// before `t2`. Arithmetic saturates rather than wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch itself
    pub const EPOCH: Timestamp = Timestamp(0);

    /// The maximum representable instant
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    /// Current wall-clock time
    pub fn now() -> Self {
        // Pre-epoch clocks clamp to the epoch rather than wrapping
        Timestamp(Utc::now().timestamp_micros().max(0) as u64)
    }

    /// Construct from microseconds since the epoch
    pub fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Construct from milliseconds since the epoch
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(1_000))
    }

    /// Construct from seconds since the epoch
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Microseconds since the epoch
    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Milliseconds since the epoch (truncating)
    pub fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Seconds since the epoch (truncating)
    pub fn as_secs(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Elapsed time since an earlier instant, zero if `earlier` is later
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }

    /// This instant moved back by a duration, clamped at the epoch
    pub fn saturating_sub(&self, d: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(d.as_micros() as u64))
    }

    /// RFC 3339 rendering in UTC with second precision
    ///
    /// This is the canonical serial form surfaced by `_serial` summary
    /// fields, e.g. `2024-05-01T12:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        match DateTime::<Utc>::from_timestamp_micros(self.0 as i64) {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            // Out of chrono's range; fall back to the raw count
            None => format!("+{}us", self.0),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}
