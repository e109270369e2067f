//! Capacity classification over the trailing seven-day window.
//!
//! The derived tier has no memory: it depends only on which days in the
//! window were completed and how much effort was reported. Manual overrides
//! from [`Settings`] are layered on afterwards by [`effective_tier`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{trailing_window, WINDOW_DAYS};
use crate::state::{DailyLog, Settings, StateOverride};

/// Ordered capacity classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityTier {
    #[default]
    Fragile,
    Stable,
    Capable,
    High,
}

impl CapacityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityTier::Fragile => "FRAGILE",
            CapacityTier::Stable => "STABLE",
            CapacityTier::Capable => "CAPABLE",
            CapacityTier::High => "HIGH",
        }
    }

    /// CAPABLE or HIGH.
    pub fn is_proven(&self) -> bool {
        *self >= CapacityTier::Capable
    }
}

impl std::fmt::Display for CapacityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityReading {
    pub tier: CapacityTier,
    /// Oldest first.
    pub history: [bool; WINDOW_DAYS],
    pub show_ups: u32,
    pub total_effort: u32,
    /// Mean effort of completed days, 0.0 when none.
    pub average_effort: f64,
}

/// Classify the seven days ending at `window_end`.
pub fn classify(log: &DailyLog, window_end: NaiveDate) -> CapacityReading {
    let mut history = [false; WINDOW_DAYS];
    let mut show_ups = 0u32;
    let mut total_effort = 0u32;

    for (slot, day) in history.iter_mut().zip(trailing_window(window_end)) {
        if let Some(entry) = log.get(&day).filter(|e| e.completed) {
            *slot = true;
            show_ups += 1;
            total_effort = total_effort.saturating_add(entry.effort_minutes);
        }
    }

    let average_effort = if show_ups > 0 {
        f64::from(total_effort) / f64::from(show_ups)
    } else {
        0.0
    };

    CapacityReading {
        tier: tier_for(show_ups, average_effort),
        history,
        show_ups,
        total_effort,
        average_effort,
    }
}

/// Threshold table; first matching rule wins.
pub fn tier_for(show_ups: u32, average_effort: f64) -> CapacityTier {
    match show_ups {
        0..=2 => CapacityTier::Fragile,
        3..=5 if average_effort < 20.0 => CapacityTier::Stable,
        3..=6 if average_effort >= 20.0 => CapacityTier::Capable,
        7 if average_effort >= 30.0 => CapacityTier::High,
        // e.g. six show-ups with light effort, or a full week under 30 min.
        _ => CapacityTier::Stable,
    }
}

/// Apply manual overrides to a derived tier.
///
/// Precedence: forced recovery, forced push, then maintenance mode (which
/// caps the tier at STABLE).
pub fn effective_tier(derived: CapacityTier, settings: &Settings) -> CapacityTier {
    match settings.state_override {
        StateOverride::ForceRecovery => CapacityTier::Fragile,
        StateOverride::ForcePush => CapacityTier::High,
        StateOverride::Auto if settings.maintenance_mode => derived.min(CapacityTier::Stable),
        StateOverride::Auto => derived,
    }
}
