//! End-to-end scenarios across classifier, progression and the engine.

use chrono::NaiveDate;
use wings_core::dates::add_days;
use wings_core::state::{DailyEntry, ObligationKind};
use wings_core::{
    classify, Category, CapacityTier, Completion, CompletionOutcome, DailyLog, EngineConfig,
    Excuse, FixedClock, GrowthLedger, Level, MissOutcome, ObligationOutcome, SettingsUpdate,
    StateOverride, WingsEngine, WingsSnapshot,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        seed: Some(11),
        ..EngineConfig::default()
    }
}

fn completed(effort: u32) -> DailyEntry {
    let mut entry = DailyEntry::pending("work", Category::Skill, ObligationKind::Task, false);
    entry.completed = true;
    entry.effort_minutes = effort;
    entry
}

/// A user who has been around for a while: one old, unkept entry.
fn with_history(mut snapshot: WingsSnapshot) -> WingsSnapshot {
    snapshot.daily.insert(
        add_days(today(), -3),
        DailyEntry::pending("old", Category::Body, ObligationKind::Task, false),
    );
    snapshot
}

fn engine_at(snapshot: WingsSnapshot, date: NaiveDate) -> WingsEngine {
    WingsEngine::from_snapshot(snapshot, FixedClock(date), config()).unwrap()
}

#[test]
fn test_scenario_a_empty_log_is_fragile() {
    let reading = classify(&DailyLog::new(), today());
    assert_eq!(reading.tier, CapacityTier::Fragile);
    assert_eq!(reading.history, [false; 7]);
}

#[test]
fn test_scenario_b_full_week_at_forty_minutes_is_high() {
    let log: DailyLog = (0..7)
        .map(|i| (add_days(today(), -i), completed(40)))
        .collect();
    let reading = classify(&log, today());
    assert_eq!(reading.show_ups, 7);
    assert_eq!(reading.average_effort, 40.0);
    assert_eq!(reading.tier, CapacityTier::High);
}

#[test]
fn test_scenario_c_four_days_averaging_fifteen_is_stable() {
    let log: DailyLog = [(0, 10), (-2, 20), (-3, 15), (-5, 15)]
        .into_iter()
        .map(|(offset, effort)| (add_days(today(), offset), completed(effort)))
        .collect();
    let reading = classify(&log, today());
    assert_eq!(reading.show_ups, 4);
    assert_eq!(reading.average_effort, 15.0);
    assert_eq!(reading.tier, CapacityTier::Stable);
}

#[test]
fn test_scenario_d_hard_mode_failure_resets_progression() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.level = Level::TWO;
    snapshot.capacity = CapacityTier::Capable;
    snapshot.momentum.current_streak = 9;
    snapshot.momentum.longest_streak = 9;
    snapshot.self_trust.promises_made = 9;
    snapshot.settings.hard_mode = true;
    snapshot.growth = GrowthLedger {
        highest_level_ever: Level::TWO,
        highest_capacity_ever: CapacityTier::High,
        peak_weekly_average_effort: 50,
        ..GrowthLedger::default()
    };
    // Completed days before yesterday must not rebuild capacity this cycle.
    for offset in 2..7 {
        snapshot
            .daily
            .insert(add_days(today(), -offset), completed(50));
    }

    let mut engine = engine_at(snapshot, today());
    let report = engine.recalculate();

    assert!(report.miss.is_hard_mode_failure());
    assert_eq!(engine.level(), Level::ZERO);
    assert_eq!(engine.derived_capacity(), CapacityTier::Fragile);
    assert!(engine.growth().is_zero());
    assert_eq!(engine.momentum().current_streak, 0);
    assert_eq!(engine.failure_pending(), Some(add_days(today(), -1)));
    assert!(!engine.settings().hard_mode);
    assert_eq!(engine.snapshot().daily.len(), 5);
}

#[test]
fn test_acknowledged_failure_is_not_penalized_again() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.level = Level::ONE;
    snapshot.self_trust.promises_made = 3;
    snapshot.settings.hard_mode = true;

    let mut engine = engine_at(with_history(snapshot), today());
    engine.recalculate();
    assert!(engine.acknowledge_failure());
    assert!(!engine.acknowledge_failure());

    let report = engine.recalculate();
    assert_eq!(report.miss, MissOutcome::AlreadyRecorded);
    assert_eq!(engine.failure_pending(), None);
    assert_eq!(engine.level(), Level::ZERO);
}

#[test]
fn test_scenario_e_soft_miss_softens_streak_by_one() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.level = Level::ONE;
    snapshot.momentum.current_streak = 5;
    snapshot.momentum.longest_streak = 5;
    snapshot.self_trust.promises_made = 5;

    let mut engine = engine_at(with_history(snapshot), today());
    let report = engine.recalculate();

    assert_eq!(
        report.miss,
        MissOutcome::SoftMiss {
            date: add_days(today(), -1),
            level_before: Level::ONE,
            level_after: Level::ZERO,
            streak_before: 5,
            streak_after: 4,
        }
    );
    assert_eq!(engine.momentum().current_streak, 4);
    assert_eq!(engine.level(), Level::ZERO);

    // Level never goes below zero.
    let mut engine = engine_at(engine.into_snapshot(), add_days(today(), 1));
    engine.recalculate();
    assert_eq!(engine.level(), Level::ZERO);
    assert_eq!(engine.momentum().current_streak, 3);
}

#[test]
fn test_scenario_f_third_completion_reaches_level_one() {
    let start = today();
    let mut snapshot = WingsSnapshot::default();

    for day in 0..3 {
        let date = add_days(start, day);
        let mut engine = engine_at(snapshot, date);
        engine.recalculate();
        engine.generate_obligation();
        let outcome = engine.complete_obligation(Completion::Rule { followed: true });

        let CompletionOutcome::Completed {
            streak,
            level,
            leveled_up,
            ..
        } = outcome
        else {
            panic!("day {day} not completed: {outcome:?}");
        };
        assert_eq!(streak, day as u32 + 1);
        if day < 2 {
            assert_eq!(level, Level::ZERO);
            assert!(!leveled_up);
        } else {
            assert_eq!(level, Level::ONE);
            assert!(leveled_up);
        }
        snapshot = engine.into_snapshot();
    }

    assert_eq!(snapshot.growth.highest_level_ever, Level::ONE);
    assert_eq!(snapshot.capacity, CapacityTier::Stable);
    assert_eq!(snapshot.growth.highest_capacity_ever, CapacityTier::Stable);
}

#[test]
fn test_idempotent_recalculate_after_soft_miss() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.momentum.current_streak = 2;
    snapshot.momentum.longest_streak = 2;
    snapshot.self_trust.promises_made = 2;

    let mut engine = engine_at(with_history(snapshot), today());
    engine.recalculate();
    let once = engine.snapshot().clone();
    engine.recalculate();
    assert_eq!(engine.snapshot(), &once);
}

#[test]
fn test_override_precedence() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.capacity = CapacityTier::High;
    snapshot.growth.highest_capacity_ever = CapacityTier::High;
    snapshot.growth.peak_weekly_average_effort = 100;
    let mut engine = engine_at(snapshot, today());

    assert_eq!(engine.effective_capacity(), CapacityTier::High);
    assert_eq!(engine.minimum_effort_today(), 60);

    engine
        .update_settings(&SettingsUpdate {
            maintenance_mode: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(engine.effective_capacity(), CapacityTier::Stable);
    assert_eq!(engine.minimum_effort_today(), 1);

    // An explicit override beats maintenance for capacity.
    engine
        .update_settings(&SettingsUpdate {
            state_override: Some(StateOverride::ForceRecovery),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(engine.effective_capacity(), CapacityTier::Fragile);

    engine
        .update_settings(&SettingsUpdate {
            state_override: Some(StateOverride::ForcePush),
            maintenance_mode: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(engine.effective_capacity(), CapacityTier::High);
    // floor(100 * 1.1) = 110, clamped to the 60 minute budget.
    let requirement = engine.effort_requirement();
    assert_eq!(requirement.floor, 110);
    assert_eq!(requirement.minutes, 60);
    assert!(requirement.is_clamped());

    // The ledger ratchets on derived capacity, not the override.
    assert_eq!(engine.derived_capacity(), CapacityTier::High);
}

#[test]
fn test_maintenance_mode_excuses_misses() {
    let mut snapshot = WingsSnapshot::default();
    snapshot.level = Level::TWO;
    snapshot.momentum.current_streak = 8;
    snapshot.momentum.longest_streak = 8;
    snapshot.self_trust.promises_made = 8;
    snapshot.settings.maintenance_mode = true;
    snapshot.settings.hard_mode = true;

    let mut engine = engine_at(with_history(snapshot), today());
    let report = engine.recalculate();
    assert_eq!(
        report.miss,
        MissOutcome::Excused {
            reason: Excuse::MaintenanceMode
        }
    );
    assert_eq!(engine.level(), Level::TWO);
    assert_eq!(engine.momentum().current_streak, 8);
}

#[test]
fn test_first_day_recalculates_after_every_completion() {
    for hard_mode in [false, true] {
        let mut engine = WingsEngine::new(config(), FixedClock(today()));
        if hard_mode {
            engine.toggle_hard_mode();
        }

        // Activation, then the same-day cycle after each event.
        engine.recalculate();
        engine.generate_obligation();
        engine.recalculate();
        let outcome = engine.complete_obligation(Completion::Rule { followed: true });
        assert!(matches!(outcome, CompletionOutcome::Completed { streak: 1, .. }));
        let report = engine.recalculate();

        assert!(matches!(report.miss, MissOutcome::Excused { .. }));
        assert_eq!(engine.momentum().current_streak, 1);
        assert_eq!(engine.momentum().last_missed_date, None);
        assert_eq!(engine.failure_pending(), None);
        assert_eq!(engine.settings().hard_mode, hard_mode);

        // Next day the completed first day is not a miss either.
        let mut engine = engine_at(engine.into_snapshot(), add_days(today(), 1));
        assert_eq!(engine.recalculate().miss, MissOutcome::NoMiss);
        assert_eq!(engine.momentum().current_streak, 1);
    }
}

#[test]
fn test_failure_must_be_acknowledged_before_flying_again() {
    let mut snapshot = with_history(WingsSnapshot::default());
    snapshot.self_trust.promises_made = 1;
    snapshot.settings.hard_mode = true;

    let mut engine = engine_at(snapshot, today());
    assert!(engine.recalculate().miss.is_hard_mode_failure());
    let failed_on = add_days(today(), -1);

    assert_eq!(
        engine.generate_obligation(),
        ObligationOutcome::FailurePending { date: failed_on }
    );
    assert_eq!(
        engine.recalculate().miss,
        MissOutcome::FailurePending { date: failed_on }
    );

    assert!(engine.acknowledge_failure());
    assert_eq!(engine.recalculate().miss, MissOutcome::AlreadyRecorded);
    assert!(matches!(
        engine.generate_obligation(),
        ObligationOutcome::Created { .. }
    ));
}
