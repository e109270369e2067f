//! Level and streak state machine.
//!
//! Completions push the streak up and cross level thresholds. A missed day
//! is evaluated once per calendar transition: a soft miss costs one level and
//! one streak day, a miss in Hard Mode wipes progression entirely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTier;
use crate::state::{DailyLog, Momentum, WingsSnapshot};

/// Progression level, 0 to 3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const ZERO: Level = Level(0);
    pub const ONE: Level = Level(1);
    pub const TWO: Level = Level(2);
    pub const THREE: Level = Level(3);
    pub const MAX: Level = Level::THREE;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Level(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Consecutive completions needed to leave this level; `None` at the top.
    pub fn advance_threshold(self) -> Option<u32> {
        match self.0 {
            0 => Some(3),
            1 => Some(7),
            2 => Some(14),
            _ => None,
        }
    }

    pub fn raised(self) -> Self {
        Level((self.0 + 1).min(Self::MAX.0))
    }

    pub fn lowered(self) -> Self {
        Level(self.0.saturating_sub(1))
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level must be 0-3, got {value}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of folding one completion into level and streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStep {
    pub streak: u32,
    pub level: Level,
    pub leveled_up: bool,
}

/// Advance streak and, when the threshold is crossed, level.
pub fn on_completion(level: Level, current_streak: u32) -> CompletionStep {
    let streak = current_streak.saturating_add(1);
    let leveled_up = level
        .advance_threshold()
        .is_some_and(|needed| streak >= needed);
    CompletionStep {
        streak,
        level: if leveled_up { level.raised() } else { level },
        leveled_up,
    }
}

/// Why a missed day carries no penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Excuse {
    /// Nothing was committed to on or before the evaluated day.
    NoCommitments,
    MaintenanceMode,
}

/// Outcome of evaluating yesterday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MissOutcome {
    /// Yesterday was completed.
    NoMiss,
    /// The penalty for this date was already applied.
    AlreadyRecorded,
    Excused { reason: Excuse },
    SoftMiss {
        date: NaiveDate,
        level_before: Level,
        level_after: Level,
        streak_before: u32,
        streak_after: u32,
    },
    HardModeFailure {
        date: NaiveDate,
        level_before: Level,
        streak_before: u32,
    },
    /// Evaluation is suspended until the failure on `date` is acknowledged.
    FailurePending { date: NaiveDate },
}

impl MissOutcome {
    pub fn is_hard_mode_failure(&self) -> bool {
        matches!(self, MissOutcome::HardModeFailure { .. })
    }
}

fn completed_on(log: &DailyLog, date: NaiveDate) -> bool {
    log.get(&date).is_some_and(|e| e.completed)
}

fn already_recorded(momentum: &Momentum, date: NaiveDate) -> bool {
    momentum.last_missed_date == Some(date) || momentum.last_hard_mode_failure == Some(date)
}

/// Evaluate `yesterday` and apply the penalty, if any, to `state`.
///
/// Safe to call repeatedly: once a date is stamped as missed the call is a
/// no-op for that date.
pub fn evaluate_miss(state: &mut WingsSnapshot, yesterday: NaiveDate) -> MissOutcome {
    if completed_on(&state.daily, yesterday) {
        return MissOutcome::NoMiss;
    }
    if already_recorded(&state.momentum, yesterday) {
        return MissOutcome::AlreadyRecorded;
    }
    if state.self_trust.promises_made == 0 || state.daily.range(..=yesterday).next().is_none() {
        return MissOutcome::Excused {
            reason: Excuse::NoCommitments,
        };
    }
    if state.settings.maintenance_mode {
        return MissOutcome::Excused {
            reason: Excuse::MaintenanceMode,
        };
    }

    let level_before = state.level;
    let streak_before = state.momentum.current_streak;

    if state.settings.hard_mode {
        hard_mode_failure(state, yesterday);
        tracing::warn!(
            date = %yesterday,
            level_before = level_before.value(),
            streak_before,
            "hard mode failure: progression reset"
        );
        return MissOutcome::HardModeFailure {
            date: yesterday,
            level_before,
            streak_before,
        };
    }

    state.level = level_before.lowered();
    state.momentum.current_streak = streak_before.saturating_sub(1);
    state.momentum.last_missed_date = Some(yesterday);
    tracing::info!(
        date = %yesterday,
        level = state.level.value(),
        streak = state.momentum.current_streak,
        "missed day recorded"
    );

    MissOutcome::SoftMiss {
        date: yesterday,
        level_before,
        level_after: state.level,
        streak_before,
        streak_after: state.momentum.current_streak,
    }
}

/// Catastrophic reset. The daily log is left untouched.
fn hard_mode_failure(state: &mut WingsSnapshot, date: NaiveDate) {
    state.level = Level::ZERO;
    state.capacity = CapacityTier::Fragile;
    state.growth.reset();
    state.momentum.current_streak = 0;
    state.momentum.last_hard_mode_failure = Some(date);
    // Stamped too so the miss is not re-penalized as soft after acknowledgement.
    state.momentum.last_missed_date = Some(date);
    state.settings.hard_mode = false;
}

/// Clear the pending failure notice. Progression is not restored.
pub fn acknowledge_failure(momentum: &mut Momentum) -> bool {
    momentum.last_hard_mode_failure.take().is_some()
}
