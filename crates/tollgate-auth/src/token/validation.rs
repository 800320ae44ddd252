//! Time-based claim validation.
//!
//! Only claims that are present are checked. With current time `t` and skew
//! `s`:
//!
//! - `exp`: rejected when `t >= exp + s`
//! - `nbf`: rejected when `t < nbf - s`
//! - `iat`: rejected when `t < iat - s`

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use crate::token::claims::{ClaimSet, IAT, NBF};
use crate::token::error::{ClaimViolation, JwtError};

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time, in Unix seconds.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp.
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl FixedClock {
    /// Creates a clock fixed at a Unix timestamp.
    #[must_use]
    pub fn at(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Creates a clock fixed at a date-time.
    #[must_use]
    pub fn at_datetime(datetime: OffsetDateTime) -> Self {
        Self(datetime.unix_timestamp())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Checks `exp`, `nbf` and `iat` against the current time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimValidator {
    skew_seconds: i64,
}

impl ClaimValidator {
    /// Creates a validator that tolerates `skew` of clock drift.
    #[must_use]
    pub fn new(skew: Duration) -> Self {
        Self {
            skew_seconds: i64::try_from(skew.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Creates a validator with the skew given in seconds. Negative values
    /// are treated as zero.
    #[must_use]
    pub fn with_skew_seconds(skew_seconds: i64) -> Self {
        Self {
            skew_seconds: skew_seconds.max(0),
        }
    }

    /// Configured skew in seconds.
    #[must_use]
    pub fn skew_seconds(&self) -> i64 {
        self.skew_seconds
    }

    /// Validates the time claims of `claims` at `now`.
    ///
    /// # Errors
    /// - `ClaimViolation::Expired` if `exp` has passed
    /// - `ClaimViolation::NotYetValid` if `nbf` or `iat` lies in the future
    /// - `MalformedToken` if one of the claims is not an integer
    pub fn validate(&self, claims: &ClaimSet, now: i64) -> Result<(), JwtError> {
        let skew = self.skew_seconds;

        if let Some(exp) = claims.expiration()? {
            if now >= exp.saturating_add(skew) {
                return Err(ClaimViolation::Expired { exp, now }.into());
            }
        }

        if let Some(nbf) = claims.not_before()? {
            if now < nbf.saturating_sub(skew) {
                return Err(not_yet_valid(NBF, nbf, now));
            }
        }

        if let Some(iat) = claims.issued_at()? {
            if now < iat.saturating_sub(skew) {
                return Err(not_yet_valid(IAT, iat, now));
            }
        }

        Ok(())
    }
}

fn not_yet_valid(claim: &'static str, not_before: i64, now: i64) -> JwtError {
    ClaimViolation::NotYetValid {
        claim,
        not_before,
        now,
    }
    .into()
}
