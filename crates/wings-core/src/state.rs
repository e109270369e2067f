//! Persisted data model.
//!
//! [`WingsSnapshot`] is the single record written to storage. Everything the
//! engine knows lives in it; derived values (capacity, show-up history) are
//! cached here for readers but are always recomputable from the log.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTier;
use crate::dates::WINDOW_DAYS;
use crate::error::ValidationError;
use crate::growth::GrowthLedger;
use crate::progression::Level;

/// Schema version written into every snapshot.
pub const SCHEMA_VERSION: &str = "5.0";

/// Area of life an obligation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Body,
    Order,
    Skill,
    Focus,
    Flight,
    Ground,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Body,
        Category::Order,
        Category::Skill,
        Category::Focus,
        Category::Flight,
        Category::Ground,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Body => "BODY",
            Category::Order => "ORDER",
            Category::Skill => "SKILL",
            Category::Focus => "FOCUS",
            Category::Flight => "FLIGHT",
            Category::Ground => "GROUND",
        }
    }
}

/// Flavor of a daily rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    Standard,
    /// Low-stimulation boredom training.
    Boredom,
}

/// Whether the day's obligation is a timed task or a rule to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rule", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationKind {
    Task,
    Rule(RuleKind),
}

/// The single obligation for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub description: String,
    pub completed: bool,
    pub effort_minutes: u32,
    pub category: Category,
    pub system_generated: bool,
    #[serde(default = "default_kind")]
    pub kind: ObligationKind,
}

fn default_kind() -> ObligationKind {
    ObligationKind::Task
}

impl DailyEntry {
    /// A fresh, incomplete obligation.
    pub fn pending(
        description: impl Into<String>,
        category: Category,
        kind: ObligationKind,
        system_generated: bool,
    ) -> Self {
        Self {
            description: description.into(),
            completed: false,
            effort_minutes: 0,
            category,
            system_generated,
            kind,
        }
    }
}

/// Date-keyed obligation history.
pub type DailyLog = BTreeMap<NaiveDate, DailyEntry>;

/// Streak bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Momentum {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_missed_date: Option<NaiveDate>,
    pub last_hard_mode_failure: Option<NaiveDate>,
    pub total_completions: u32,
    /// Oldest first; last element is the window end.
    pub show_up_history: [bool; WINDOW_DAYS],
}

/// Promises made versus kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SelfTrust {
    pub promises_made: u32,
    pub promises_kept: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    #[default]
    Full,
    Reduced,
}

/// Manual override of the derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateOverride {
    #[default]
    Auto,
    ForceRecovery,
    ForcePush,
}

/// User-controlled flags, applied as layers over derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub motion: Motion,
    #[serde(default)]
    pub user_age: Option<u32>,
    #[serde(default)]
    pub hard_mode: bool,
    #[serde(default)]
    pub state_override: StateOverride,
    #[serde(default)]
    pub anti_dopamine: bool,
    #[serde(default)]
    pub focus_lock: bool,
    #[serde(default)]
    pub exploration_mode: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default = "default_true")]
    pub growth_mode: bool,
    #[serde(default)]
    pub planning_mode: bool,
    /// Block new obligations for the rest of the day once one is completed.
    #[serde(default)]
    pub hard_stop_active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            motion: Motion::Full,
            user_age: None,
            hard_mode: false,
            state_override: StateOverride::Auto,
            anti_dopamine: false,
            focus_lock: false,
            exploration_mode: false,
            maintenance_mode: false,
            growth_mode: true,
            planning_mode: false,
            hard_stop_active: false,
        }
    }
}

/// Partial settings change; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub motion: Option<Motion>,
    pub user_age: Option<u32>,
    pub hard_mode: Option<bool>,
    pub state_override: Option<StateOverride>,
    pub anti_dopamine: Option<bool>,
    pub focus_lock: Option<bool>,
    pub exploration_mode: Option<bool>,
    pub maintenance_mode: Option<bool>,
    pub planning_mode: Option<bool>,
    pub hard_stop_active: Option<bool>,
}

impl Settings {
    /// Apply every field present in `update`.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(v) = update.motion {
            self.motion = v;
        }
        if let Some(v) = update.user_age {
            self.user_age = Some(v);
        }
        if let Some(v) = update.hard_mode {
            self.hard_mode = v;
        }
        if let Some(v) = update.state_override {
            self.state_override = v;
        }
        if let Some(v) = update.anti_dopamine {
            self.anti_dopamine = v;
        }
        if let Some(v) = update.focus_lock {
            self.focus_lock = v;
        }
        if let Some(v) = update.exploration_mode {
            self.exploration_mode = v;
        }
        if let Some(v) = update.maintenance_mode {
            self.maintenance_mode = v;
        }
        if let Some(v) = update.planning_mode {
            self.planning_mode = v;
        }
        if let Some(v) = update.hard_stop_active {
            self.hard_stop_active = v;
        }
    }
}

/// Long-term goal and identity statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub long_term_goal: String,
    pub wing_statement: String,
    pub locked_until: Option<NaiveDate>,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            long_term_goal: String::new(),
            wing_statement: "I will convert pressure into momentum.".into(),
            locked_until: None,
        }
    }
}

/// A declared direction, immutable until `locked_until`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningDirection {
    pub text: String,
    pub locked_until: NaiveDate,
}

/// Strategic planning inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningState {
    #[serde(default)]
    pub directions: Vec<PlanningDirection>,
    /// Daily ceiling in minutes; the effort policy never asks for more.
    pub time_budget: u32,
    #[serde(default)]
    pub priority_weights: BTreeMap<Category, u32>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

pub const MIN_TIME_BUDGET: u32 = 5;
pub const MAX_TIME_BUDGET: u32 = 180;
pub const MAX_PRIORITY_WEIGHT: u32 = 100;

impl PlanningState {
    pub fn with_time_budget(time_budget: u32) -> Self {
        let priority_weights = [
            Category::Body,
            Category::Skill,
            Category::Order,
            Category::Focus,
        ]
        .into_iter()
        .map(|c| (c, 50))
        .collect();
        Self {
            directions: Vec::new(),
            time_budget,
            priority_weights,
            constraints: Vec::new(),
        }
    }

    /// Directions still inside their lock period on `today`.
    ///
    /// A direction unlocks on its `locked_until` date.
    pub fn active_directions(&self, today: NaiveDate) -> impl Iterator<Item = &PlanningDirection> {
        self.directions
            .iter()
            .filter(move |d| d.locked_until > today)
    }
}

impl Default for PlanningState {
    fn default() -> Self {
        Self::with_time_budget(60)
    }
}

/// Partial planning change; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningUpdate {
    pub time_budget: Option<u32>,
    pub priority_weights: Option<BTreeMap<Category, u32>>,
    pub constraints: Option<Vec<String>>,
}

impl PlanningUpdate {
    /// Check ranges before anything is applied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(budget) = self.time_budget {
            if !(MIN_TIME_BUDGET..=MAX_TIME_BUDGET).contains(&budget) {
                return Err(ValidationError::OutOfRange {
                    field: "time_budget".into(),
                    value: i64::from(budget),
                    min: i64::from(MIN_TIME_BUDGET),
                    max: i64::from(MAX_TIME_BUDGET),
                });
            }
        }
        if let Some(weights) = &self.priority_weights {
            for (category, weight) in weights {
                if *weight > MAX_PRIORITY_WEIGHT {
                    return Err(ValidationError::OutOfRange {
                        field: format!("priority_weights.{}", category.as_str()),
                        value: i64::from(*weight),
                        min: 0,
                        max: i64::from(MAX_PRIORITY_WEIGHT),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Signals used for energy-first obligation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnergySignals {
    pub last_session_minutes: u32,
    pub last_session_date: Option<NaiveDate>,
    /// Missed days in the trailing window.
    pub recent_misses: u32,
}

/// Weekly boredom-training counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BoredomTraining {
    pub last_session: Option<NaiveDate>,
    pub sessions_this_week: u32,
    pub week_start: Option<NaiveDate>,
}

/// Answer to the Sunday reality check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCheck {
    /// Monday of the week answered for.
    pub week_of: NaiveDate,
    pub answered_on: Option<NaiveDate>,
    pub showed_up_more_than_disappeared: Option<bool>,
}

/// Self-reported mood, 1 (struggling) to 5 (thriving).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Mood {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Mood(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "mood".into(),
                value: i64::from(value),
                min: 1,
                max: 5,
            })
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> u8 {
        mood.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: Mood,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewKind {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Up,
    Down,
    Stable,
}

/// Scores computed when a review is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewInsights {
    /// 0-100
    pub consistency_score: u32,
    /// 1.0-5.0
    pub average_mood: f64,
    /// 0-100
    pub discipline_score: f64,
    pub trend: MoodTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeReviewEntry {
    pub id: String,
    pub kind: ReviewKind,
    pub date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub responses: Vec<ReviewResponse>,
    pub insights: ReviewInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LifeReviewState {
    pub mood_log: Vec<MoodEntry>,
    pub reviews: Vec<LifeReviewEntry>,
    pub last_weekly_review: Option<NaiveDate>,
    pub last_monthly_review: Option<NaiveDate>,
}

/// Everything the engine persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WingsSnapshot {
    pub version: String,
    pub level: Level,
    /// Last derived capacity (before overrides).
    pub capacity: CapacityTier,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub daily: DailyLog,
    #[serde(default)]
    pub momentum: Momentum,
    #[serde(default)]
    pub self_trust: SelfTrust,
    #[serde(default)]
    pub weekly_checks: Vec<WeeklyCheck>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub growth: GrowthLedger,
    #[serde(default)]
    pub planning: PlanningState,
    #[serde(default)]
    pub energy: EnergySignals,
    #[serde(default)]
    pub boredom_training: BoredomTraining,
    #[serde(default)]
    pub life_review: LifeReviewState,
    #[serde(default)]
    pub hard_stop_until: Option<NaiveDate>,
}

impl WingsSnapshot {
    /// Initial state with a given daily time budget.
    pub fn fresh(time_budget: u32) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            level: Level::ZERO,
            capacity: CapacityTier::Fragile,
            identity: Identity::default(),
            daily: DailyLog::new(),
            momentum: Momentum::default(),
            self_trust: SelfTrust::default(),
            weekly_checks: Vec::new(),
            settings: Settings::default(),
            growth: GrowthLedger::default(),
            planning: PlanningState::with_time_budget(time_budget),
            energy: EnergySignals::default(),
            boredom_training: BoredomTraining::default(),
            life_review: LifeReviewState::default(),
            hard_stop_until: None,
        }
    }
}

impl Default for WingsSnapshot {
    fn default() -> Self {
        Self::fresh(PlanningState::default().time_budget)
    }
}
