//! Tracker schema history.
//!
//! | version | file | adds |
//! |---|---|---|
//! | 1 | `0001_init.sql` | profile row, selections, severities, timeline entries |
//! | 2 | `0002_timeline_append_only.sql` | triggers rejecting timeline UPDATE/DELETE |
//! | 3 | `0003_activity_records.sql` | full activity records (notes, colors, untaken medications) |
//!
//! All pending steps run inside one transaction; `PRAGMA user_version`
//! holds the last applied step.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "timeline_append_only",
        sql: include_str!("0002_timeline_append_only.sql"),
    },
    SchemaStep {
        version: 3,
        name: "activity_records",
        sql: include_str!("0003_activity_records.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the schema up to `latest_version`.
///
/// # Errors
/// `UnsupportedSchemaVersion` when the file was written by a newer build;
/// SQLite errors roll the whole upgrade back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, to_version
    );
    Ok(())
}
