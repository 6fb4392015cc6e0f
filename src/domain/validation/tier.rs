//! Check tiers - the escalating re-check cadence for pending contacts.
//!
//! Each timed tier owns the age window `[min_age, next tier's min_age)`; the
//! last timed tier is unbounded above. A contact that stays pending therefore
//! becomes eligible once per tier as it ages, and a failed check at one tier
//! is retried at the next.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Named minimum-age threshold for scheduled re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckTier {
    #[serde(rename = "15m")]
    Tier15m,
    #[serde(rename = "30m")]
    Tier30m,
    #[serde(rename = "1h")]
    Tier1h,
    /// Every pending contact regardless of age.
    #[serde(rename = "all")]
    All,
}

/// Half-open age window `[min, max)`. `max = None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    pub min: Duration,
    pub max: Option<Duration>,
}

impl AgeWindow {
    pub fn contains(&self, age: Duration) -> bool {
        age >= self.min && self.max.map_or(true, |max| age < max)
    }
}

impl CheckTier {
    /// Timed tiers in ascending order of `min_age`.
    pub const TIMED: [CheckTier; 3] = [CheckTier::Tier15m, CheckTier::Tier30m, CheckTier::Tier1h];

    pub fn label(&self) -> &'static str {
        match self {
            CheckTier::Tier15m => "15m",
            CheckTier::Tier30m => "30m",
            CheckTier::Tier1h => "1h",
            CheckTier::All => "all",
        }
    }

    pub fn min_age(&self) -> Duration {
        match self {
            CheckTier::Tier15m => Duration::minutes(15),
            CheckTier::Tier30m => Duration::minutes(30),
            CheckTier::Tier1h => Duration::hours(1),
            CheckTier::All => Duration::zero(),
        }
    }

    /// The tier whose window starts where this one ends.
    pub fn next(&self) -> Option<CheckTier> {
        match self {
            CheckTier::Tier15m => Some(CheckTier::Tier30m),
            CheckTier::Tier30m => Some(CheckTier::Tier1h),
            CheckTier::Tier1h | CheckTier::All => None,
        }
    }

    /// Ages this tier selects.
    pub fn window(&self) -> AgeWindow {
        AgeWindow {
            min: self.min_age(),
            max: self.next().map(|next| next.min_age()),
        }
    }

    /// Returns true if a pending contact of this age is eligible.
    pub fn admits(&self, age: Duration) -> bool {
        self.window().contains(age)
    }
}

impl fmt::Display for CheckTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CheckTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "15m" | "15min" => Ok(CheckTier::Tier15m),
            "30m" | "30min" => Ok(CheckTier::Tier30m),
            "1h" | "60m" | "60min" => Ok(CheckTier::Tier1h),
            "all" => Ok(CheckTier::All),
            other => Err(ValidationError::invalid_format(
                "tier_label",
                format!("unknown tier '{}', expected 15m, 30m, 1h or all", other),
            )),
        }
    }
}
