//! Injected application state container.
//!
//! Bundles the selection state and the tracking service so a UI layer
//! receives one explicit object instead of reaching for a global.

use crate::repo::profile_store::{ProfileStore, SqliteProfileStore};
use crate::repo::timeline_repo::{SqliteTimelineRepository, TimelineRepository};
use crate::service::selection::SelectionState;
use crate::service::tracking::TrackingService;
use rusqlite::Connection;

/// Profile selections plus the activity timeline for one local user.
pub struct AppState<P: ProfileStore, T: TimelineRepository> {
    pub selection: SelectionState<P>,
    pub tracking: TrackingService<T>,
}

impl<P: ProfileStore, T: TimelineRepository> AppState<P, T> {
    /// Loads both halves from their stores. Never fails; load errors are
    /// logged and replaced by empty state.
    pub fn load(profile_store: P, timeline_repo: T) -> Self {
        Self {
            selection: SelectionState::load(profile_store),
            tracking: TrackingService::load(timeline_repo),
        }
    }
}

/// App state backed by one migrated SQLite connection.
pub type SqliteAppState<'conn> =
    AppState<SqliteProfileStore<'conn>, SqliteTimelineRepository<'conn>>;

impl<'conn> AppState<SqliteProfileStore<'conn>, SqliteTimelineRepository<'conn>> {
    pub fn open_sqlite(conn: &'conn Connection) -> Self {
        Self::load(
            SqliteProfileStore::new(conn),
            SqliteTimelineRepository::new(conn),
        )
    }
}
