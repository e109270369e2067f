//! Choosing the day's obligation.
//!
//! Selection is split into pluggable [`ObligationStrategy`] implementations.
//! The [`ObligationPlanner`] routes to one of three slots (exploration,
//! recovery, standard) based on settings, capacity and energy. All randomness
//! flows through the `RngCore` handed in by the caller so a seeded generator
//! gives reproducible picks.

mod catalog;

use chrono::NaiveDate;
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTier;
use crate::dates::add_days;
use crate::state::{Category, EnergySignals, ObligationKind, PlanningState, RuleKind, Settings};

pub use catalog::{deep_prompts, light_prompts, GROUND_PROTOCOLS, LOW_STIMULATION_RULES};

/// Categories a user can weight when no weights are configured.
const DEFAULT_CATEGORIES: [Category; 4] = [
    Category::Body,
    Category::Order,
    Category::Skill,
    Category::Focus,
];

/// Coarse energy estimate from recent sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBand {
    Low,
    Medium,
    High,
}

impl EnergyBand {
    /// Low after three or more misses this week; High after a long session in
    /// the last two days with no misses.
    pub fn from_signals(signals: &EnergySignals, today: NaiveDate) -> Self {
        if signals.recent_misses >= 3 {
            return EnergyBand::Low;
        }
        let recent_session = signals
            .last_session_date
            .is_some_and(|d| d >= add_days(today, -2));
        if signals.recent_misses == 0 && recent_session && signals.last_session_minutes >= 45 {
            EnergyBand::High
        } else {
            EnergyBand::Medium
        }
    }
}

/// Inputs a strategy may consult.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub today: NaiveDate,
    /// Derived capacity, before overrides.
    pub capacity: CapacityTier,
    pub energy: EnergyBand,
    pub total_completions: u32,
    pub settings: &'a Settings,
    pub planning: &'a PlanningState,
}

/// What a strategy produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub description: String,
    pub category: Category,
    pub kind: ObligationKind,
}

/// A way of picking today's obligation.
pub trait ObligationStrategy: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    fn select(&self, ctx: &SelectionContext<'_>, rng: &mut dyn RngCore) -> Selection;
}

/// Rotates through [`GROUND_PROTOCOLS`] by total completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundProtocol;

impl ObligationStrategy for GroundProtocol {
    fn name(&self) -> &'static str {
        "ground_protocol"
    }

    fn select(&self, ctx: &SelectionContext<'_>, _rng: &mut dyn RngCore) -> Selection {
        let idx = ctx.total_completions as usize % GROUND_PROTOCOLS.len();
        Selection {
            description: GROUND_PROTOCOLS[idx].to_string(),
            category: Category::Ground,
            kind: ObligationKind::Task,
        }
    }
}

/// Random low-stimulation rule for exploration mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowStimulation;

impl ObligationStrategy for LowStimulation {
    fn name(&self) -> &'static str {
        "low_stimulation"
    }

    fn select(&self, _ctx: &SelectionContext<'_>, rng: &mut dyn RngCore) -> Selection {
        let idx = rng.gen_range(0..LOW_STIMULATION_RULES.len());
        Selection {
            description: LOW_STIMULATION_RULES[idx].to_string(),
            category: Category::Ground,
            kind: ObligationKind::Rule(RuleKind::Boredom),
        }
    }
}

/// Weighted category pick from the planning weights, anchored to an active
/// direction once capacity is proven.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedCategory;

impl WeightedCategory {
    fn pick_category(planning: &PlanningState, rng: &mut dyn RngCore) -> Category {
        let weighted: Vec<(Category, u32)> = planning
            .priority_weights
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(c, w)| (*c, *w))
            .collect();

        match WeightedIndex::new(weighted.iter().map(|(_, w)| *w)) {
            Ok(dist) => weighted[dist.sample(rng)].0,
            Err(_) => DEFAULT_CATEGORIES[rng.gen_range(0..DEFAULT_CATEGORIES.len())],
        }
    }
}

impl ObligationStrategy for WeightedCategory {
    fn name(&self) -> &'static str {
        "weighted_category"
    }

    fn select(&self, ctx: &SelectionContext<'_>, rng: &mut dyn RngCore) -> Selection {
        let directions: Vec<_> = ctx.planning.active_directions(ctx.today).collect();

        if ctx.capacity.is_proven() && !directions.is_empty() {
            let direction = directions[rng.gen_range(0..directions.len())];
            let prompts = light_prompts(Category::Flight);
            let prompt = prompts[rng.gen_range(0..prompts.len())];
            return Selection {
                description: format!("{prompt} toward \"{}\".", direction.text),
                category: Category::Flight,
                kind: ObligationKind::Task,
            };
        }

        let category = Self::pick_category(ctx.planning, rng);
        let prompts = if ctx.energy == EnergyBand::High {
            deep_prompts(category)
        } else {
            light_prompts(category)
        };
        Selection {
            description: prompts[rng.gen_range(0..prompts.len())].to_string(),
            category,
            kind: ObligationKind::Task,
        }
    }
}

/// Which slot the planner routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Exploration,
    Recovery,
    Standard,
}

/// Routes a selection to one of three strategies.
pub struct ObligationPlanner {
    exploration: Box<dyn ObligationStrategy>,
    recovery: Box<dyn ObligationStrategy>,
    standard: Box<dyn ObligationStrategy>,
}

impl ObligationPlanner {
    pub fn new(
        exploration: Box<dyn ObligationStrategy>,
        recovery: Box<dyn ObligationStrategy>,
        standard: Box<dyn ObligationStrategy>,
    ) -> Self {
        Self {
            exploration,
            recovery,
            standard,
        }
    }

    pub fn with_exploration(mut self, strategy: Box<dyn ObligationStrategy>) -> Self {
        self.exploration = strategy;
        self
    }

    pub fn with_recovery(mut self, strategy: Box<dyn ObligationStrategy>) -> Self {
        self.recovery = strategy;
        self
    }

    pub fn with_standard(mut self, strategy: Box<dyn ObligationStrategy>) -> Self {
        self.standard = strategy;
        self
    }

    /// Exploration mode first, then fragile capacity or low energy, else
    /// standard.
    pub fn route(ctx: &SelectionContext<'_>) -> Route {
        if ctx.settings.exploration_mode {
            Route::Exploration
        } else if ctx.capacity == CapacityTier::Fragile || ctx.energy == EnergyBand::Low {
            Route::Recovery
        } else {
            Route::Standard
        }
    }

    pub fn strategy(&self, route: Route) -> &dyn ObligationStrategy {
        match route {
            Route::Exploration => self.exploration.as_ref(),
            Route::Recovery => self.recovery.as_ref(),
            Route::Standard => self.standard.as_ref(),
        }
    }

    /// Route and select in one step.
    pub fn select(&self, ctx: &SelectionContext<'_>, rng: &mut dyn RngCore) -> (Route, Selection) {
        let route = Self::route(ctx);
        (route, self.strategy(route).select(ctx, rng))
    }
}

impl Default for ObligationPlanner {
    fn default() -> Self {
        Self::new(
            Box::new(LowStimulation),
            Box::new(GroundProtocol),
            Box::new(WeightedCategory),
        )
    }
}

impl std::fmt::Debug for ObligationPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObligationPlanner")
            .field("exploration", &self.exploration.name())
            .field("recovery", &self.recovery.name())
            .field("standard", &self.standard.name())
            .finish()
    }
}
