//! Load/save boundary around [`WingsEngine`].
//!
//! A session loads the snapshot once, recalculates for today, and writes the
//! snapshot back after every mutating operation. The engine itself never sees
//! the store.

use chrono::NaiveDate;

use crate::dates::Clock;
use crate::engine::{
    Completion, CompletionOutcome, ObligationOutcome, RecalculationReport, WingsEngine,
};
use crate::error::Result;
use crate::state::{
    Category, LifeReviewEntry, MoodEntry, PlanningDirection, PlanningUpdate, ReviewKind,
    ReviewResponse, SettingsUpdate, SCHEMA_VERSION,
};
use crate::storage::{stored_version, EngineConfig, SnapshotStore};

pub struct WingsSession<S: SnapshotStore> {
    store: S,
    engine: WingsEngine,
    opened: RecalculationReport,
}

impl<S: SnapshotStore> WingsSession<S> {
    /// Load (or start) state, run today's recalculation and persist it.
    ///
    /// A snapshot from another schema version is discarded with a warning,
    /// whatever its shape. Only its `version` field is read.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn open(store: S, clock: impl Clock + 'static, config: EngineConfig) -> Result<Self> {
        let mut engine = match store.load_raw()? {
            Some(raw) => match stored_version(&raw)? {
                Some(version) if version == SCHEMA_VERSION => {
                    WingsEngine::from_snapshot(serde_json::from_str(&raw)?, clock, config)?
                }
                found => {
                    tracing::warn!(
                        found = found.as_deref().unwrap_or("none"),
                        expected = SCHEMA_VERSION,
                        "discarding snapshot from another schema version"
                    );
                    WingsEngine::new(config, clock)
                }
            },
            None => {
                tracing::debug!("no snapshot stored, starting fresh");
                WingsEngine::new(config, clock)
            }
        };

        let opened = engine.recalculate();
        let session = Self {
            store,
            engine,
            opened,
        };
        session.persist()?;
        Ok(session)
    }

    fn persist(&self) -> Result<()> {
        self.store.save(self.engine.snapshot())
    }

    /// Read-only access for projections.
    pub fn engine(&self) -> &WingsEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The recalculation run when the session was opened.
    pub fn opened_with(&self) -> &RecalculationReport {
        &self.opened
    }

    pub fn into_parts(self) -> (S, WingsEngine) {
        (self.store, self.engine)
    }

    pub fn recalculate(&mut self) -> Result<RecalculationReport> {
        let report = self.engine.recalculate();
        self.persist()?;
        Ok(report)
    }

    pub fn generate_obligation(&mut self) -> Result<ObligationOutcome> {
        let outcome = self.engine.generate_obligation();
        self.persist()?;
        Ok(outcome)
    }

    pub fn commit_obligation(
        &mut self,
        description: &str,
        category: Category,
    ) -> Result<ObligationOutcome> {
        let outcome = self.engine.commit_obligation(description, category)?;
        self.persist()?;
        Ok(outcome)
    }

    pub fn complete_obligation(&mut self, completion: Completion) -> Result<CompletionOutcome> {
        let outcome = self.engine.complete_obligation(completion);
        if matches!(outcome, CompletionOutcome::Completed { .. }) {
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn acknowledge_failure(&mut self) -> Result<bool> {
        let cleared = self.engine.acknowledge_failure();
        if cleared {
            self.persist()?;
        }
        Ok(cleared)
    }

    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<()> {
        self.engine.update_settings(update)?;
        self.persist()
    }

    pub fn toggle_hard_mode(&mut self) -> Result<bool> {
        let on = self.engine.toggle_hard_mode();
        self.persist()?;
        Ok(on)
    }

    pub fn update_planning(&mut self, update: &PlanningUpdate) -> Result<()> {
        self.engine.update_planning(update)?;
        self.persist()
    }

    pub fn add_direction(&mut self, text: &str) -> Result<PlanningDirection> {
        let direction = self.engine.add_direction(text)?;
        self.persist()?;
        Ok(direction)
    }

    pub fn set_long_term_goal(&mut self, goal: &str) -> Result<()> {
        self.engine.set_long_term_goal(goal)?;
        self.persist()
    }

    pub fn lock_goal(&mut self) -> Result<NaiveDate> {
        let until = self.engine.lock_goal()?;
        self.persist()?;
        Ok(until)
    }

    pub fn answer_weekly_check(&mut self, showed_up_more_than_disappeared: bool) -> Result<()> {
        self.engine
            .answer_weekly_check(showed_up_more_than_disappeared);
        self.persist()
    }

    pub fn log_mood(&mut self, mood: u8, note: Option<String>) -> Result<MoodEntry> {
        let entry = self.engine.log_mood(mood, note)?;
        self.persist()?;
        Ok(entry)
    }

    pub fn submit_life_review(
        &mut self,
        kind: ReviewKind,
        responses: Vec<ReviewResponse>,
    ) -> Result<LifeReviewEntry> {
        let entry = self.engine.submit_life_review(kind, responses)?;
        self.persist()?;
        Ok(entry)
    }

    /// Wipe state and the stored snapshot, then store the fresh state.
    pub fn reset_all(&mut self) -> Result<()> {
        self.engine.reset_all();
        self.store.clear()?;
        self.persist()
    }
}
