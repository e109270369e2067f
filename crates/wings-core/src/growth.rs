//! Growth memory: the best state ever reached.
//!
//! Every scalar in [`GrowthLedger`] only moves up. The single way back down
//! is [`GrowthLedger::reset`], which the engine calls on a Hard Mode failure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::capacity::{classify, CapacityTier};
use crate::progression::Level;
use crate::state::{Category, DailyLog};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GrowthLedger {
    pub highest_level_ever: Level,
    pub highest_capacity_ever: CapacityTier,
    /// Rounded minutes.
    pub peak_weekly_average_effort: u32,
    #[serde(default)]
    pub category_usage: BTreeMap<Category, u32>,
}

impl GrowthLedger {
    /// Ratchet the ledger after a completion of `category`.
    pub fn update(
        &mut self,
        new_level: Level,
        new_capacity: CapacityTier,
        log: &DailyLog,
        window_end: NaiveDate,
        category: Category,
    ) {
        self.highest_level_ever = self.highest_level_ever.max(new_level);
        self.highest_capacity_ever = self.highest_capacity_ever.max(new_capacity);
        self.peak_weekly_average_effort = self
            .peak_weekly_average_effort
            .max(weekly_average_effort(log, window_end));
        *self.category_usage.entry(category).or_insert(0) += 1;
    }

    /// Zero value. Only a Hard Mode failure or a full reset goes here.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the ledger still holds its zero value.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// CAPABLE or HIGH has been reached at some point.
    pub fn has_proven_strength(&self) -> bool {
        self.highest_capacity_ever.is_proven()
    }
}

/// Mean effort of completed days in the window, rounded to whole minutes.
pub fn weekly_average_effort(log: &DailyLog, window_end: NaiveDate) -> u32 {
    classify(log, window_end).average_effort.round() as u32
}
