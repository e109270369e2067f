//! The Wings engine: one owned state value and every operation on it.
//!
//! [`WingsEngine`] holds a [`WingsSnapshot`] plus the injected clock, RNG and
//! obligation planner. It never touches storage; see
//! [`WingsSession`](crate::session::WingsSession) for the load/save boundary.
//!
//! Rejections that are part of normal use (completing twice, generating while
//! hard-stopped) come back as outcome enums. Only operations that take free
//! user input return [`ValidationError`]s.

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::capacity::{classify, effective_tier, CapacityTier};
use crate::dates::{
    add_days, days_remaining, start_of_month, start_of_week, trailing_window, Clock, WINDOW_DAYS,
};
use crate::effort::{self, EffortRequirement};
use crate::error::{CoreError, Result, ValidationError};
use crate::growth::GrowthLedger;
use crate::obligation::{EnergyBand, ObligationPlanner, Route, SelectionContext};
use crate::progression::{self, on_completion, Level, MissOutcome};
use crate::reports::{self, AccessGates, PlanningAccess, ReviewsDue, WeeklyReport};
use crate::state::{
    Category, DailyEntry, DailyLog, Identity, LifeReviewEntry, Momentum, Mood, MoodEntry,
    ObligationKind, PlanningDirection, PlanningState, PlanningUpdate, ReviewKind, ReviewResponse,
    RuleKind, Settings, SettingsUpdate, WeeklyCheck, WingsSnapshot, SCHEMA_VERSION,
};
use crate::storage::EngineConfig;

/// How today's obligation is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Completion {
    /// Minutes actually spent.
    Timed { minutes: u32 },
    /// Whether a rule-type obligation was followed.
    Rule { followed: bool },
}

/// Result of [`WingsEngine::complete_obligation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed {
        effort_minutes: u32,
        streak: u32,
        level: Level,
        leveled_up: bool,
        capacity: CapacityTier,
    },
    /// A Hard Mode failure on `date` has not been acknowledged.
    FailurePending { date: NaiveDate },
    NoObligation,
    AlreadyCompleted,
    BelowMinimum { required: u32, offered: u32 },
    RuleNotFollowed,
}

/// Result of generating or committing today's obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ObligationOutcome {
    Created {
        entry: DailyEntry,
        /// Planner slot used; `None` for user-authored obligations.
        route: Option<Route>,
    },
    AlreadyExists,
    HardStopped { until: NaiveDate },
    /// A Hard Mode failure on `date` has not been acknowledged.
    FailurePending { date: NaiveDate },
}

/// What a recalculation found and applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub date: NaiveDate,
    pub miss: MissOutcome,
    /// Derived capacity after the cycle.
    pub capacity: CapacityTier,
    pub show_up_history: [bool; WINDOW_DAYS],
}

/// Owned engine state with injected clock and randomness.
pub struct WingsEngine {
    snapshot: WingsSnapshot,
    clock: Box<dyn Clock>,
    rng: Mcg128Xsl64,
    planner: ObligationPlanner,
    config: EngineConfig,
}

impl std::fmt::Debug for WingsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WingsEngine")
            .field("today", &self.clock.today())
            .field("level", &self.snapshot.level)
            .field("capacity", &self.snapshot.capacity)
            .field("planner", &self.planner)
            .finish_non_exhaustive()
    }
}

fn rng_for(config: &EngineConfig) -> Mcg128Xsl64 {
    match config.seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    }
}

/// Days before `today` in the trailing window that were not completed,
/// counting only from the first logged date.
fn recent_misses(log: &DailyLog, today: NaiveDate) -> u32 {
    let Some(first) = log.keys().next().copied() else {
        return 0;
    };
    trailing_window(today)[..WINDOW_DAYS - 1]
        .iter()
        .filter(|d| **d >= first && !log.get(d).is_some_and(|e| e.completed))
        .count() as u32
}

fn non_empty(field: &str, text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

impl WingsEngine {
    /// Fresh state.
    pub fn new(config: EngineConfig, clock: impl Clock + 'static) -> Self {
        let snapshot = WingsSnapshot::fresh(config.default_time_budget);
        Self {
            snapshot,
            clock: Box::new(clock),
            rng: rng_for(&config),
            planner: ObligationPlanner::default(),
            config,
        }
    }

    /// Rebuild from a persisted snapshot.
    ///
    /// # Errors
    /// [`CoreError::SchemaMismatch`] when the snapshot was written by another
    /// schema version.
    pub fn from_snapshot(
        snapshot: WingsSnapshot,
        clock: impl Clock + 'static,
        config: EngineConfig,
    ) -> Result<Self> {
        if snapshot.version != SCHEMA_VERSION {
            return Err(CoreError::SchemaMismatch {
                found: snapshot.version,
                expected: SCHEMA_VERSION.to_string(),
            });
        }
        Ok(Self {
            snapshot,
            clock: Box::new(clock),
            rng: rng_for(&config),
            planner: ObligationPlanner::default(),
            config,
        })
    }

    /// Replace the obligation planner.
    pub fn with_planner(mut self, planner: ObligationPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn snapshot(&self) -> &WingsSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> WingsSnapshot {
        self.snapshot
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // =========================================================================
    // Daily cycle
    // =========================================================================

    /// Evaluate yesterday, then refresh the derived capacity and window.
    ///
    /// Running it twice on the same day leaves the state unchanged. While a
    /// Hard Mode failure is unacknowledged nothing is evaluated or refreshed.
    pub fn recalculate(&mut self) -> RecalculationReport {
        let today = self.clock.today();
        if let Some(date) = self.failure_pending() {
            tracing::debug!(date = %today, failed_on = %date, "recalculation suspended: failure pending");
            return self.report(today, MissOutcome::FailurePending { date });
        }

        let miss = progression::evaluate_miss(&mut self.snapshot, self.clock.yesterday());

        if self
            .snapshot
            .hard_stop_until
            .is_some_and(|until| until <= today)
        {
            self.snapshot.hard_stop_until = None;
        }

        if !miss.is_hard_mode_failure() {
            let reading = classify(&self.snapshot.daily, today);
            self.snapshot.capacity = reading.tier;
            self.snapshot.momentum.show_up_history = reading.history;
            self.snapshot.energy.recent_misses = recent_misses(&self.snapshot.daily, today);
        }

        let report = self.report(today, miss);
        tracing::debug!(
            date = %today,
            capacity = %report.capacity,
            level = self.snapshot.level.value(),
            ?miss,
            "recalculated"
        );
        report
    }

    fn report(&self, date: NaiveDate, miss: MissOutcome) -> RecalculationReport {
        RecalculationReport {
            date,
            miss,
            capacity: self.snapshot.capacity,
            show_up_history: self.snapshot.momentum.show_up_history,
        }
    }

    fn creation_guard(&self, today: NaiveDate) -> Option<ObligationOutcome> {
        if let Some(date) = self.failure_pending() {
            return Some(ObligationOutcome::FailurePending { date });
        }
        if self.snapshot.daily.contains_key(&today) {
            return Some(ObligationOutcome::AlreadyExists);
        }
        match self.snapshot.hard_stop_until {
            Some(until) if today < until => Some(ObligationOutcome::HardStopped { until }),
            _ => None,
        }
    }

    fn insert_today(&mut self, today: NaiveDate, entry: DailyEntry) {
        self.snapshot.daily.insert(today, entry);
        self.snapshot.self_trust.promises_made += 1;
    }

    /// Let the planner pick today's obligation.
    pub fn generate_obligation(&mut self) -> ObligationOutcome {
        let today = self.clock.today();
        if let Some(outcome) = self.creation_guard(today) {
            return outcome;
        }

        let ctx = SelectionContext {
            today,
            capacity: self.snapshot.capacity,
            energy: EnergyBand::from_signals(&self.snapshot.energy, today),
            total_completions: self.snapshot.momentum.total_completions,
            settings: &self.snapshot.settings,
            planning: &self.snapshot.planning,
        };
        let (route, selection) = self.planner.select(&ctx, &mut self.rng);
        let strategy = self.planner.strategy(route).name();

        let entry = DailyEntry::pending(
            selection.description,
            selection.category,
            selection.kind,
            true,
        );
        if entry.kind == ObligationKind::Rule(RuleKind::Boredom) {
            self.record_boredom_session(today);
        }
        self.insert_today(today, entry.clone());

        tracing::info!(
            date = %today,
            strategy,
            category = entry.category.as_str(),
            "obligation generated"
        );
        ObligationOutcome::Created {
            entry,
            route: Some(route),
        }
    }

    fn record_boredom_session(&mut self, today: NaiveDate) {
        let week = start_of_week(today);
        let training = &mut self.snapshot.boredom_training;
        if training.week_start != Some(week) {
            training.week_start = Some(week);
            training.sessions_this_week = 0;
        }
        training.sessions_this_week += 1;
        training.last_session = Some(today);
    }

    /// Commit to a user-authored obligation for today.
    pub fn commit_obligation(
        &mut self,
        description: &str,
        category: Category,
    ) -> Result<ObligationOutcome> {
        let description = non_empty("description", description)?;
        let today = self.clock.today();
        if let Some(outcome) = self.creation_guard(today) {
            return Ok(outcome);
        }

        let entry = DailyEntry::pending(description, category, ObligationKind::Task, false);
        self.insert_today(today, entry.clone());
        tracing::info!(date = %today, category = category.as_str(), "obligation committed");
        Ok(ObligationOutcome::Created { entry, route: None })
    }

    /// Close today's obligation.
    ///
    /// On success every dependent record moves together: level and streak,
    /// derived capacity, growth ledger, momentum, self trust, energy signals
    /// and the hard stop.
    pub fn complete_obligation(&mut self, completion: Completion) -> CompletionOutcome {
        let today = self.clock.today();
        if let Some(date) = self.failure_pending() {
            tracing::debug!(date = %today, failed_on = %date, "completion rejected: failure pending");
            return CompletionOutcome::FailurePending { date };
        }
        let Some(current) = self.snapshot.daily.get(&today) else {
            tracing::debug!(date = %today, "completion rejected: no obligation");
            return CompletionOutcome::NoObligation;
        };
        if current.completed {
            tracing::debug!(date = %today, "completion rejected: already completed");
            return CompletionOutcome::AlreadyCompleted;
        }

        let required = self.minimum_effort_today();
        let effort_minutes = match completion {
            Completion::Timed { minutes } if minutes < required => {
                tracing::debug!(date = %today, required, minutes, "completion rejected: below minimum");
                return CompletionOutcome::BelowMinimum {
                    required,
                    offered: minutes,
                };
            }
            Completion::Timed { minutes } => minutes,
            Completion::Rule { followed: false } => {
                tracing::debug!(date = %today, "completion rejected: rule not followed");
                return CompletionOutcome::RuleNotFollowed;
            }
            Completion::Rule { followed: true } => required,
        };
        let category = current.category;

        let mut next = self.snapshot.clone();
        if let Some(entry) = next.daily.get_mut(&today) {
            entry.completed = true;
            entry.effort_minutes = effort_minutes;
        }

        let step = on_completion(next.level, next.momentum.current_streak);
        let reading = classify(&next.daily, today);
        next.level = step.level;
        next.capacity = reading.tier;
        next.growth
            .update(step.level, reading.tier, &next.daily, today, category);

        let momentum = &mut next.momentum;
        momentum.current_streak = step.streak;
        momentum.longest_streak = momentum.longest_streak.max(step.streak);
        momentum.total_completions += 1;
        momentum.show_up_history = reading.history;

        next.self_trust.promises_kept += 1;

        next.energy.last_session_minutes = effort_minutes;
        next.energy.last_session_date = Some(today);
        next.energy.recent_misses = recent_misses(&next.daily, today);

        if next.settings.hard_stop_active {
            next.hard_stop_until = Some(add_days(today, 1));
        }

        self.snapshot = next;

        if step.leveled_up {
            tracing::info!(level = step.level.value(), streak = step.streak, "level up");
        }
        tracing::info!(
            date = %today,
            effort_minutes,
            streak = step.streak,
            capacity = %reading.tier,
            "obligation completed"
        );

        CompletionOutcome::Completed {
            effort_minutes,
            streak: step.streak,
            level: step.level,
            leveled_up: step.leveled_up,
            capacity: reading.tier,
        }
    }

    /// Dismiss the Hard Mode failure notice. Returns whether one was pending.
    pub fn acknowledge_failure(&mut self) -> bool {
        progression::acknowledge_failure(&mut self.snapshot.momentum)
    }

    // =========================================================================
    // Settings and planning
    // =========================================================================

    /// Apply a partial settings change.
    ///
    /// # Errors
    /// [`ValidationError::Blocked`] when the change would switch planning mode
    /// on while planning is blocked.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<&Settings> {
        let mut candidate = self.snapshot.settings.clone();
        candidate.apply(update);

        let effective = effective_tier(self.snapshot.capacity, &candidate);
        if update.planning_mode == Some(true)
            && reports::planning_access(&candidate, effective) == PlanningAccess::Blocked
        {
            return Err(ValidationError::Blocked {
                what: "planning mode".into(),
                reason: "a state override or maintenance mode is active".into(),
            }
            .into());
        }

        self.snapshot.settings = candidate;
        tracing::debug!(settings = ?self.snapshot.settings, "settings updated");
        Ok(&self.snapshot.settings)
    }

    /// Flip Hard Mode. Returns the new value.
    pub fn toggle_hard_mode(&mut self) -> bool {
        let settings = &mut self.snapshot.settings;
        settings.hard_mode = !settings.hard_mode;
        tracing::info!(hard_mode = settings.hard_mode, "hard mode toggled");
        settings.hard_mode
    }

    /// Apply a partial planning change after validating it.
    pub fn update_planning(&mut self, update: &PlanningUpdate) -> Result<&PlanningState> {
        update.validate()?;
        let planning = &mut self.snapshot.planning;
        if let Some(budget) = update.time_budget {
            planning.time_budget = budget;
        }
        if let Some(weights) = &update.priority_weights {
            planning.priority_weights = weights.clone();
        }
        if let Some(constraints) = &update.constraints {
            planning.constraints = constraints.clone();
        }
        Ok(&self.snapshot.planning)
    }

    /// Declare a direction, locked for the configured number of days.
    pub fn add_direction(&mut self, text: &str) -> Result<PlanningDirection> {
        let text = non_empty("direction", text)?;
        let today = self.clock.today();
        let limit = self.config.max_directions;
        if self.snapshot.planning.active_directions(today).count() >= limit {
            return Err(ValidationError::LimitReached {
                collection: "directions".into(),
                limit,
            }
            .into());
        }

        let direction = PlanningDirection {
            text,
            locked_until: add_days(today, i64::from(self.config.direction_lock_days)),
        };
        self.snapshot.planning.directions.push(direction.clone());
        tracing::info!(locked_until = %direction.locked_until, "direction added");
        Ok(direction)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn set_long_term_goal(&mut self, goal: &str) -> Result<()> {
        if let Some(until) = self.goal_locked_until() {
            return Err(ValidationError::Locked {
                what: "long-term goal".into(),
                until,
            }
            .into());
        }
        self.snapshot.identity.long_term_goal = goal.trim().to_string();
        Ok(())
    }

    /// Lock the current goal. Returns the unlock date.
    pub fn lock_goal(&mut self) -> Result<NaiveDate> {
        non_empty("long_term_goal", &self.snapshot.identity.long_term_goal)?;
        if let Some(until) = self.goal_locked_until() {
            return Err(ValidationError::Locked {
                what: "long-term goal".into(),
                until,
            }
            .into());
        }
        let until = add_days(self.clock.today(), i64::from(self.config.goal_lock_days));
        self.snapshot.identity.locked_until = Some(until);
        tracing::info!(locked_until = %until, "goal locked");
        Ok(until)
    }

    // =========================================================================
    // Reflection
    // =========================================================================

    /// Record this week's reality-check answer, replacing an earlier one.
    pub fn answer_weekly_check(&mut self, showed_up_more_than_disappeared: bool) -> &WeeklyCheck {
        let today = self.clock.today();
        let week = start_of_week(today);
        let checks = &mut self.snapshot.weekly_checks;
        checks.retain(|c| c.week_of != week);
        checks.push(WeeklyCheck {
            week_of: week,
            answered_on: Some(today),
            showed_up_more_than_disappeared: Some(showed_up_more_than_disappeared),
        });
        &checks[checks.len() - 1]
    }

    /// Log today's mood (1-5). A second log on the same day replaces the first.
    pub fn log_mood(&mut self, mood: u8, note: Option<String>) -> Result<MoodEntry> {
        let mood = Mood::try_from(mood)?;
        let today = self.clock.today();
        let entry = MoodEntry {
            date: today,
            mood,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        let log = &mut self.snapshot.life_review.mood_log;
        log.retain(|m| m.date != today);
        log.push(entry.clone());
        Ok(entry)
    }

    /// Store a weekly or monthly review with freshly computed insights.
    pub fn submit_life_review(
        &mut self,
        kind: ReviewKind,
        responses: Vec<ReviewResponse>,
    ) -> Result<LifeReviewEntry> {
        if responses.iter().all(|r| r.answer.trim().is_empty()) {
            return Err(ValidationError::Empty {
                field: "responses".into(),
            }
            .into());
        }

        let today = self.clock.today();
        let period_start = match kind {
            ReviewKind::Weekly => start_of_week(today),
            ReviewKind::Monthly => start_of_month(today),
        };
        let insights = reports::review_insights(
            &self.snapshot.life_review.mood_log,
            &self.snapshot.momentum.show_up_history,
            self.snapshot.momentum.current_streak,
        );
        let entry = LifeReviewEntry {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            date: today,
            period_start,
            period_end: today,
            responses,
            insights,
        };

        let review = &mut self.snapshot.life_review;
        match kind {
            ReviewKind::Weekly => review.last_weekly_review = Some(today),
            ReviewKind::Monthly => review.last_monthly_review = Some(today),
        }
        review.reviews.push(entry.clone());
        tracing::info!(id = %entry.id, ?kind, "life review submitted");
        Ok(entry)
    }

    /// Wipe everything, daily log included.
    pub fn reset_all(&mut self) {
        self.snapshot = WingsSnapshot::fresh(self.config.default_time_budget);
        tracing::warn!("all state reset");
    }

    // =========================================================================
    // Projections
    // =========================================================================

    pub fn level(&self) -> Level {
        self.snapshot.level
    }

    /// Capacity from the trailing window, before overrides.
    pub fn derived_capacity(&self) -> CapacityTier {
        self.snapshot.capacity
    }

    /// Capacity after the override layer.
    pub fn effective_capacity(&self) -> CapacityTier {
        effective_tier(self.snapshot.capacity, &self.snapshot.settings)
    }

    pub fn momentum(&self) -> &Momentum {
        &self.snapshot.momentum
    }

    pub fn growth(&self) -> &GrowthLedger {
        &self.snapshot.growth
    }

    pub fn settings(&self) -> &Settings {
        &self.snapshot.settings
    }

    pub fn planning(&self) -> &PlanningState {
        &self.snapshot.planning
    }

    pub fn identity(&self) -> &Identity {
        &self.snapshot.identity
    }

    pub fn today_obligation(&self) -> Option<&DailyEntry> {
        self.snapshot.daily.get(&self.clock.today())
    }

    pub fn minimum_effort_today(&self) -> u32 {
        self.effort_requirement().minutes
    }

    pub fn effort_requirement(&self) -> EffortRequirement {
        effort::requirement(
            &self.snapshot.growth,
            &self.snapshot.settings,
            self.snapshot.planning.time_budget,
        )
    }

    pub fn energy(&self) -> EnergyBand {
        EnergyBand::from_signals(&self.snapshot.energy, self.clock.today())
    }

    /// Date of an unacknowledged Hard Mode failure.
    pub fn failure_pending(&self) -> Option<NaiveDate> {
        self.snapshot.momentum.last_hard_mode_failure
    }

    /// Whether new obligations are blocked for the rest of today.
    pub fn hard_stopped(&self) -> bool {
        self.snapshot
            .hard_stop_until
            .is_some_and(|until| self.clock.today() < until)
    }

    /// Unlock date while the goal is locked.
    pub fn goal_locked_until(&self) -> Option<NaiveDate> {
        self.snapshot
            .identity
            .locked_until
            .filter(|until| days_remaining(self.clock.today(), *until) > 0)
    }

    pub fn gates(&self) -> AccessGates {
        reports::access_gates(
            self.snapshot.level,
            self.effective_capacity(),
            &self.snapshot.growth,
            self.goal_locked_until().is_some(),
            &self.snapshot.settings,
        )
    }

    pub fn weekly_report(&self) -> WeeklyReport {
        reports::weekly_report(
            self.clock.today(),
            &self.snapshot.momentum.show_up_history,
            self.effective_capacity(),
            &self.snapshot.growth,
        )
    }

    pub fn weekly_check_due(&self) -> bool {
        reports::weekly_check_due(self.clock.today(), &self.snapshot.weekly_checks)
    }

    pub fn reviews_due(&self) -> ReviewsDue {
        reports::reviews_due(self.clock.today(), &self.snapshot.life_review)
    }

    pub fn trust_score(&self) -> u32 {
        reports::trust_score(&self.snapshot.self_trust)
    }
}
