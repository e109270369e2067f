//! Read-only derivations for the UI: reports, reviews and access gates.
//!
//! Nothing here mutates state. The engine feeds these from its snapshot.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTier;
use crate::dates::{start_of_month, start_of_week, WINDOW_DAYS};
use crate::growth::GrowthLedger;
use crate::progression::Level;
use crate::state::{
    LifeReviewState, MoodEntry, MoodTrend, ReviewInsights, SelfTrust, Settings, StateOverride,
    WeeklyCheck,
};

/// Percentage of promises kept, rounded. Zero before the first promise.
pub fn trust_score(trust: &SelfTrust) -> u32 {
    if trust.promises_made == 0 {
        return 0;
    }
    (f64::from(trust.promises_kept) / f64::from(trust.promises_made) * 100.0).round() as u32
}

/// Summary of the trailing week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// Monday of the current week.
    pub week: NaiveDate,
    pub flown_days: u32,
    pub missed_days: u32,
    pub verdict: String,
}

pub fn weekly_report(
    today: NaiveDate,
    history: &[bool; WINDOW_DAYS],
    capacity: CapacityTier,
    growth: &GrowthLedger,
) -> WeeklyReport {
    let flown = history.iter().filter(|d| **d).count() as u32;
    let missed = WINDOW_DAYS as u32 - flown;
    WeeklyReport {
        week: start_of_week(today),
        flown_days: flown,
        missed_days: missed,
        verdict: weekly_verdict(capacity, growth.highest_capacity_ever, flown, missed),
    }
}

/// One-line judgement of the week.
pub fn weekly_verdict(
    capacity: CapacityTier,
    highest: CapacityTier,
    flown: u32,
    missed: u32,
) -> String {
    match capacity {
        CapacityTier::Fragile if flown > 0 => {
            format!("You showed up {flown} time(s). That is a foundation. Continue.")
        }
        CapacityTier::Fragile => {
            "This was a difficult week. The only goal is to show up tomorrow.".into()
        }
        CapacityTier::Stable if highest == CapacityTier::High => {
            "This is regression. Stability is not the standard for you any longer. Re-engage."
                .into()
        }
        CapacityTier::Stable if missed == 0 => {
            "Perfect execution builds stability. You are on the right path.".into()
        }
        CapacityTier::Stable => {
            format!("Consistency is forming, but {missed} gap(s) slowed progress. Seal the leaks.")
        }
        CapacityTier::Capable if highest == CapacityTier::High && missed > 0 => {
            "You are operating below your proven potential. Close the gap.".into()
        }
        CapacityTier::Capable if missed > 1 => {
            "You are capable of more. Inconsistency is a choice. Do not choose it.".into()
        }
        CapacityTier::Capable => "Solid week. Now transition from capable to dangerous.".into(),
        CapacityTier::High if missed > 0 => {
            "You are operating at a high level. A single miss is a signal. Do not ignore it."
                .into()
        }
        CapacityTier::High => "Total execution. This is the standard. Maintain it.".into(),
    }
}

/// The reality check is asked on Sundays until answered for the week.
pub fn weekly_check_due(today: NaiveDate, checks: &[WeeklyCheck]) -> bool {
    let week = start_of_week(today);
    let answered = checks
        .iter()
        .any(|c| c.week_of == week && c.answered_on.is_some());
    today.weekday() == Weekday::Sun && !answered
}

/// Compute review scores from the mood log and momentum.
pub fn review_insights(
    mood_log: &[MoodEntry],
    history: &[bool; WINDOW_DAYS],
    current_streak: u32,
) -> ReviewInsights {
    let recent = &mood_log[mood_log.len().saturating_sub(7)..];
    let average_mood = mean_mood(recent);

    let show_ups = history.iter().filter(|d| **d).count() as f64;
    let consistency = (show_ups / WINDOW_DAYS as f64 * 100.0).round();
    let streak_bonus = f64::from(current_streak.saturating_mul(3).min(30));
    let discipline = (consistency * 0.7 + streak_bonus).min(100.0);

    let (first, second) = recent.split_at(recent.len() / 2);
    let (first_avg, second_avg) = (mean_mood(first), mean_mood(second));
    let trend = if second_avg > first_avg {
        MoodTrend::Up
    } else if second_avg < first_avg {
        MoodTrend::Down
    } else {
        MoodTrend::Stable
    };

    ReviewInsights {
        consistency_score: consistency as u32,
        average_mood,
        discipline_score: discipline,
        trend,
    }
}

/// Neutral 3.0 when there is nothing to average.
fn mean_mood(entries: &[MoodEntry]) -> f64 {
    if entries.is_empty() {
        return 3.0;
    }
    let sum: u32 = entries.iter().map(|m| u32::from(m.mood.value())).sum();
    f64::from(sum) / entries.len() as f64
}

/// Which reviews are outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewsDue {
    pub weekly: bool,
    pub monthly: bool,
}

pub fn reviews_due(today: NaiveDate, review: &LifeReviewState) -> ReviewsDue {
    let week = start_of_week(today);
    let month = start_of_month(today);
    ReviewsDue {
        weekly: review.last_weekly_review.map_or(true, |d| d < week),
        monthly: review.last_monthly_review.map_or(true, |d| d < month),
    }
}

/// Planning availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningAccess {
    Open,
    /// Reduced strategic access while in build mode.
    Limited,
    /// Exploration mode: light planning only.
    Light,
    /// A restrictive override is active.
    Blocked,
}

pub fn planning_access(settings: &Settings, capacity: CapacityTier) -> PlanningAccess {
    if settings.state_override != StateOverride::Auto || settings.maintenance_mode {
        PlanningAccess::Blocked
    } else if capacity == CapacityTier::Capable {
        PlanningAccess::Limited
    } else if settings.exploration_mode {
        PlanningAccess::Light
    } else {
        PlanningAccess::Open
    }
}

/// What the UI may offer right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGates {
    pub momentum_view: bool,
    pub goal_view: bool,
    pub time_pressure_view: bool,
    /// Goal-setting is held back until capacity is, or once was, proven.
    pub goal_setting_locked: bool,
    pub planning: PlanningAccess,
}

pub fn access_gates(
    level: Level,
    capacity: CapacityTier,
    growth: &GrowthLedger,
    goal_locked: bool,
    settings: &Settings,
) -> AccessGates {
    let fragile_now = capacity <= CapacityTier::Stable;
    AccessGates {
        momentum_view: level >= Level::TWO,
        goal_view: level >= Level::THREE,
        time_pressure_view: level >= Level::THREE,
        goal_setting_locked: fragile_now && !growth.has_proven_strength() && !goal_locked,
        planning: planning_access(settings, capacity),
    }
}
