//! Core domain logic for the SymTrack symptom tracker.
//! This crate is the single source of truth for profile and timeline
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::activity::{
    ActivityRecord, FoodItem, LoggedActivity, MedicationItem, SleepLog, SymptomLog, TherapySession,
};
pub use model::profile::{
    FlarePattern, ProfileField, ProfileParseError, SelectionSet, Severity, UserProfile,
};
pub use model::timeline::{
    day_bounds_in, DayEntries, EntryDraft, EntryId, Timeline, TimelineCategory, TimelineEntry,
};
pub use model::validation::ValidationError;
pub use repo::profile_store::{MemoryProfileStore, ProfileStore, SqliteProfileStore};
pub use repo::timeline_repo::{
    MemoryTimelineRepository, SqliteTimelineRepository, TimelineRepository,
};
pub use repo::{PersistError, PersistResult};
pub use service::app_state::{AppState, SqliteAppState};
pub use service::selection::{ObserverId, OnboardingStep, SelectionState, StateChange, StateObserver};
pub use service::tracking::{Clock, TrackingService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
