//! Result-set limits
//!
//! This module defines the configurable page-size boundary enforced by the
//! page validator. Violations surface as `InvalidLimit` request errors.
//!
//! ## Contract
//!
//! The default maximum is [`MAX_RECORDS`]. A caller-supplied limit must lie
//! in `1..=max_records`; an absent limit silently takes the maximum.

use crate::error::{Error, Result};

/// Default and maximum number of records per page
pub const MAX_RECORDS: usize = 100;

/// Result-set limits enforced by the page validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum records per page (default: [`MAX_RECORDS`])
    pub max_records: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_records: MAX_RECORDS,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    ///
    /// Useful for unit tests that exercise limit enforcement without
    /// building hundred-element fixtures.
    pub fn with_small_limits() -> Self {
        Limits { max_records: 5 }
    }

    /// Resolve a caller-supplied limit
    ///
    /// Returns the effective page size: the maximum when absent, the
    /// requested value when within bounds, `InvalidLimit` otherwise.
    pub fn validate_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            None => Ok(self.max_records),
            Some(n) if n >= 1 && n <= self.max_records => Ok(n),
            Some(n) => Err(Error::InvalidLimit {
                actual: n,
                max: self.max_records,
            }),
        }
    }
}
