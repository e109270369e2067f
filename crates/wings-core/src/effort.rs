//! Minimum effort required for today's completion.

use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTier;
use crate::growth::GrowthLedger;
use crate::state::{Settings, StateOverride};

/// Which rule produced the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortRule {
    Maintenance,
    ForcedRecovery,
    ForcedPush,
    GrowthCeiling(CapacityTier),
}

/// Floor before and after the time-budget clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortRequirement {
    pub rule: EffortRule,
    /// What the rule asks for.
    pub floor: u32,
    /// `min(floor, time_budget)`.
    pub minutes: u32,
}

impl EffortRequirement {
    /// The time budget cut the floor down.
    pub fn is_clamped(&self) -> bool {
        self.minutes < self.floor
    }
}

fn scaled(peak: u32, factor: f64) -> u32 {
    (f64::from(peak) * factor).floor() as u32
}

/// Minimum effort in minutes. Never exceeds `time_budget`.
pub fn minimum_effort(growth: &GrowthLedger, settings: &Settings, time_budget: u32) -> u32 {
    requirement(growth, settings, time_budget).minutes
}

/// Full breakdown of [`minimum_effort`].
pub fn requirement(
    growth: &GrowthLedger,
    settings: &Settings,
    time_budget: u32,
) -> EffortRequirement {
    let peak = growth.peak_weekly_average_effort;

    let (rule, floor) = if settings.maintenance_mode {
        (EffortRule::Maintenance, 1)
    } else {
        match settings.state_override {
            StateOverride::ForceRecovery => (EffortRule::ForcedRecovery, 1),
            StateOverride::ForcePush => (EffortRule::ForcedPush, scaled(peak, 1.1).max(60)),
            StateOverride::Auto => {
                let tier = growth.highest_capacity_ever;
                let floor = match tier {
                    CapacityTier::Fragile => 1,
                    CapacityTier::Stable => 10,
                    CapacityTier::Capable => scaled(peak, 0.8).max(25),
                    CapacityTier::High => scaled(peak, 0.9).max(45),
                };
                (EffortRule::GrowthCeiling(tier), floor)
            }
        }
    };

    EffortRequirement {
        rule,
        floor,
        minutes: floor.min(time_budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Level;

    fn ledger(tier: CapacityTier, peak: u32) -> GrowthLedger {
        GrowthLedger {
            highest_level_ever: Level::ZERO,
            highest_capacity_ever: tier,
            peak_weekly_average_effort: peak,
            category_usage: Default::default(),
        }
    }

    #[test]
    fn growth_ceiling_table() {
        let s = Settings::default();
        assert_eq!(minimum_effort(&ledger(CapacityTier::Fragile, 90), &s, 180), 1);
        assert_eq!(minimum_effort(&ledger(CapacityTier::Stable, 90), &s, 180), 10);
        assert_eq!(minimum_effort(&ledger(CapacityTier::Capable, 20), &s, 180), 25);
        assert_eq!(minimum_effort(&ledger(CapacityTier::Capable, 50), &s, 180), 40);
        assert_eq!(minimum_effort(&ledger(CapacityTier::High, 40), &s, 180), 45);
        assert_eq!(minimum_effort(&ledger(CapacityTier::High, 100), &s, 180), 90);
    }

    #[test]
    fn maintenance_beats_every_override() {
        let s = Settings {
            maintenance_mode: true,
            state_override: StateOverride::ForcePush,
            ..Default::default()
        };
        let req = requirement(&ledger(CapacityTier::High, 100), &s, 180);
        assert_eq!(req.rule, EffortRule::Maintenance);
        assert_eq!(req.minutes, 1);
    }

    #[test]
    fn forced_states() {
        let recovery = Settings {
            state_override: StateOverride::ForceRecovery,
            ..Default::default()
        };
        assert_eq!(minimum_effort(&ledger(CapacityTier::High, 100), &recovery, 180), 1);

        let push = Settings {
            state_override: StateOverride::ForcePush,
            ..Default::default()
        };
        assert_eq!(minimum_effort(&ledger(CapacityTier::Fragile, 0), &push, 180), 60);
        // floor(80 * 1.1) = 88
        assert_eq!(minimum_effort(&ledger(CapacityTier::Fragile, 80), &push, 180), 88);
    }

    #[test]
    fn time_budget_always_wins() {
        let push = Settings {
            state_override: StateOverride::ForcePush,
            ..Default::default()
        };
        let req = requirement(&ledger(CapacityTier::High, 100), &push, 30);
        assert_eq!(req.floor, 110);
        assert_eq!(req.minutes, 30);
        assert!(req.is_clamped());
    }
}
