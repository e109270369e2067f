//! # Wings Core Library
//!
//! This library provides the core logic for Wings, a daily discipline engine.
//! The user commits to exactly one obligation per calendar day; the engine
//! tracks whether they show up, classifies their recent capacity, advances a
//! level on sustained streaks and remembers the best state ever reached so
//! expectations never regress.
//!
//! ## Architecture
//!
//! - **Engine**: an owned state value with an injected clock and seeded RNG;
//!   every operation is a method on it
//! - **Storage**: snapshot persistence (JSON file or SQLite) and TOML-based
//!   configuration
//! - **Obligations**: pluggable selection strategies routed by capacity,
//!   energy and settings
//!
//! ## Key Components
//!
//! - [`WingsEngine`]: Core state machine
//! - [`WingsSession`]: Load/save boundary over a [`SnapshotStore`]
//! - [`Config`]: Engine and storage configuration
//! - [`ObligationStrategy`]: Trait for obligation selection

pub mod capacity;
pub mod dates;
pub mod effort;
pub mod engine;
pub mod error;
pub mod growth;
pub mod obligation;
pub mod progression;
pub mod reports;
pub mod session;
pub mod state;
pub mod storage;

pub use capacity::{classify, effective_tier, CapacityReading, CapacityTier};
pub use dates::{Clock, FixedClock, SystemClock};
pub use effort::{minimum_effort, EffortRequirement, EffortRule};
pub use engine::{
    Completion, CompletionOutcome, ObligationOutcome, RecalculationReport, WingsEngine,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use growth::GrowthLedger;
pub use obligation::{EnergyBand, ObligationPlanner, ObligationStrategy, Route, Selection};
pub use progression::{Excuse, Level, MissOutcome};
pub use reports::{AccessGates, PlanningAccess, ReviewsDue, WeeklyReport};
pub use session::WingsSession;
pub use state::{
    Category, DailyEntry, DailyLog, Momentum, PlanningUpdate, Settings, SettingsUpdate,
    StateOverride, WingsSnapshot,
};
pub use storage::{
    Config, EngineConfig, JsonFileStore, SnapshotStore, SqliteStore, StorageBackend,
};
