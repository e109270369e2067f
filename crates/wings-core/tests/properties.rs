//! Property tests for the ledger ratchet, streak bound, effort clamp and
//! classifier purity.

use chrono::NaiveDate;
use proptest::prelude::*;
use wings_core::dates::add_days;
use wings_core::state::{DailyEntry, ObligationKind};
use wings_core::{
    classify, minimum_effort, CapacityTier, Category, Completion, CompletionOutcome, DailyLog,
    EngineConfig, FixedClock, GrowthLedger, Settings, SettingsUpdate, StateOverride, WingsEngine,
    WingsSnapshot,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[derive(Debug, Clone, Copy)]
enum Day {
    Fly(u32),
    /// Switch Hard Mode on, then fly.
    FlyHard(u32),
    Skip,
}

fn arb_day() -> impl Strategy<Value = Day> {
    prop_oneof![
        4 => (1u32..120).prop_map(Day::Fly),
        1 => (1u32..120).prop_map(Day::FlyHard),
        2 => Just(Day::Skip),
    ]
}

fn arb_tier() -> impl Strategy<Value = CapacityTier> {
    prop_oneof![
        Just(CapacityTier::Fragile),
        Just(CapacityTier::Stable),
        Just(CapacityTier::Capable),
        Just(CapacityTier::High),
    ]
}

fn arb_override() -> impl Strategy<Value = StateOverride> {
    prop_oneof![
        Just(StateOverride::Auto),
        Just(StateOverride::ForceRecovery),
        Just(StateOverride::ForcePush),
    ]
}

fn ratcheted(before: &GrowthLedger, after: &GrowthLedger) -> bool {
    after.highest_level_ever >= before.highest_level_ever
        && after.highest_capacity_ever >= before.highest_capacity_ever
        && after.peak_weekly_average_effort >= before.peak_weekly_average_effort
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ledger_ratchets_and_streak_stays_bounded(days in prop::collection::vec(arb_day(), 1..40)) {
        let config = EngineConfig { seed: Some(5), ..EngineConfig::default() };
        let mut snapshot = WingsSnapshot::default();

        for (i, day) in days.iter().enumerate() {
            let date = add_days(start(), i as i64);
            let mut engine =
                WingsEngine::from_snapshot(snapshot, FixedClock(date), config.clone()).unwrap();

            let before = engine.growth().clone();
            let report = engine.recalculate();
            if report.miss.is_hard_mode_failure() {
                prop_assert!(engine.growth().is_zero());
                prop_assert!(engine.acknowledge_failure());
            } else {
                prop_assert_eq!(engine.growth(), &before);
            }

            let minutes = match *day {
                Day::Skip => None,
                Day::Fly(m) => Some(m),
                Day::FlyHard(m) => {
                    engine
                        .update_settings(&SettingsUpdate { hard_mode: Some(true), ..Default::default() })
                        .unwrap();
                    Some(m)
                }
            };

            if let Some(m) = minutes {
                engine.generate_obligation();
                let before = engine.growth().clone();
                let minutes = m.max(engine.minimum_effort_today());
                let outcome = engine.complete_obligation(Completion::Timed { minutes });
                let completed = matches!(outcome, CompletionOutcome::Completed { .. });
                prop_assert!(completed);
                prop_assert!(ratcheted(&before, engine.growth()));
                let momentum = engine.momentum();
                prop_assert!(momentum.current_streak <= momentum.longest_streak);
            }

            snapshot = engine.into_snapshot();
        }
    }

    #[test]
    fn prop_minimum_effort_never_exceeds_budget(
        tier in arb_tier(),
        peak in 0u32..1000,
        state_override in arb_override(),
        maintenance_mode in any::<bool>(),
        budget in 5u32..=180,
    ) {
        let growth = GrowthLedger {
            highest_capacity_ever: tier,
            peak_weekly_average_effort: peak,
            ..GrowthLedger::default()
        };
        let settings = Settings { state_override, maintenance_mode, ..Settings::default() };
        prop_assert!(minimum_effort(&growth, &settings, budget) <= budget);
    }

    #[test]
    fn prop_classify_is_pure(entries in prop::collection::vec((0i64..10, any::<bool>(), 0u32..200), 0..12)) {
        let end = add_days(start(), 9);
        let log: DailyLog = entries
            .into_iter()
            .map(|(offset, completed, effort)| {
                let mut entry = DailyEntry::pending("x", Category::Order, ObligationKind::Task, false);
                entry.completed = completed;
                entry.effort_minutes = effort;
                (add_days(start(), offset), entry)
            })
            .collect();

        let first = classify(&log, end);
        let second = classify(&log, end);
        prop_assert_eq!(first.tier, second.tier);
        prop_assert_eq!(first.history, second.history);
        prop_assert_eq!(first.show_ups as usize, first.history.iter().filter(|d| **d).count());
    }
}
