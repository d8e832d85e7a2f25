//! Timeline repository contracts and implementations.
//!
//! # Responsibility
//! - Persist appended timeline entries and the activity records behind them.
//! - Read entries back in canonical order.
//!
//! # Invariants
//! - Entries and activity records are append-only (enforced by schema
//!   triggers).
//! - Entry reads are ordered `timestamp_ms ASC, seq ASC`, matching the
//!   in-memory aggregate's tie-breaking by insertion order.
//! - Activity reads are in logging order.

use crate::model::activity::{ActivityRecord, LoggedActivity};
use crate::model::timeline::{day_bounds_in, TimelineCategory, TimelineEntry};
use crate::repo::{PersistError, PersistResult};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    category,
    title,
    subtitle,
    icon,
    timestamp_ms
FROM timeline_entries";

/// Durable storage for timeline entries.
pub trait TimelineRepository {
    fn append_entry(&self, entry: &TimelineEntry) -> PersistResult<()>;
    /// Stores a record after the entry it references, if any.
    fn append_activity(&self, activity: &LoggedActivity) -> PersistResult<()>;
    /// All entries, oldest first.
    fn list_entries(&self) -> PersistResult<Vec<TimelineEntry>>;
    /// Entries with `start <= timestamp < end`, oldest first.
    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PersistResult<Vec<TimelineEntry>>;
    /// All activity records, in logging order.
    fn list_activities(&self) -> PersistResult<Vec<LoggedActivity>>;

    /// Entries falling on `date` in `tz`, oldest first, without loading the
    /// rest of the timeline.
    fn list_entries_for_day_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
        date: NaiveDate,
    ) -> PersistResult<Vec<TimelineEntry>>
    where
        Self: Sized,
    {
        let (start, end) = day_bounds_in(tz, date);
        self.list_entries_between(start, end)
    }
}

impl<T: TimelineRepository + ?Sized> TimelineRepository for &T {
    fn append_entry(&self, entry: &TimelineEntry) -> PersistResult<()> {
        (**self).append_entry(entry)
    }

    fn append_activity(&self, activity: &LoggedActivity) -> PersistResult<()> {
        (**self).append_activity(activity)
    }

    fn list_activities(&self) -> PersistResult<Vec<LoggedActivity>> {
        (**self).list_activities()
    }

    fn list_entries(&self) -> PersistResult<Vec<TimelineEntry>> {
        (**self).list_entries()
    }

    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PersistResult<Vec<TimelineEntry>> {
        (**self).list_entries_between(start, end)
    }
}

/// SQLite-backed timeline repository.
pub struct SqliteTimelineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimelineRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_entries(&self, sql: &str, bounds: Option<(i64, i64)>) -> PersistResult<Vec<TimelineEntry>> {
        let mut stmt = self.conn.prepare(sql).map_err(PersistError::unavailable)?;
        let mut rows = match bounds {
            Some((start, end)) => stmt.query(params![start, end]),
            None => stmt.query([]),
        }
        .map_err(PersistError::unavailable)?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().map_err(PersistError::unavailable)? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }
}

impl TimelineRepository for SqliteTimelineRepository<'_> {
    fn append_entry(&self, entry: &TimelineEntry) -> PersistResult<()> {
        self.conn
            .execute(
                "INSERT INTO timeline_entries (
                    uuid,
                    category,
                    title,
                    subtitle,
                    icon,
                    timestamp_ms
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    entry.id().to_string(),
                    entry.category().as_str(),
                    entry.title(),
                    entry.subtitle(),
                    entry.icon(),
                    entry.timestamp().timestamp_millis(),
                ],
            )
            .map_err(PersistError::write)?;
        Ok(())
    }

    fn append_activity(&self, activity: &LoggedActivity) -> PersistResult<()> {
        let payload = serde_json::to_string(&activity.record).map_err(PersistError::Encode)?;
        self.conn
            .execute(
                "INSERT INTO activity_records (
                    entry_uuid,
                    activity,
                    payload,
                    recorded_at_ms
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    activity.entry_id.map(|id| id.to_string()),
                    activity.record.kind(),
                    payload,
                    activity.recorded_at.timestamp_millis(),
                ],
            )
            .map_err(PersistError::write)?;
        Ok(())
    }

    fn list_activities(&self) -> PersistResult<Vec<LoggedActivity>> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT entry_uuid, payload, recorded_at_ms
                 FROM activity_records
                 ORDER BY seq ASC;",
            )
            .map_err(PersistError::unavailable)?;
        let mut rows = stmt.query([]).map_err(PersistError::unavailable)?;

        let mut activities = Vec::new();
        while let Some(row) = rows.next().map_err(PersistError::unavailable)? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn list_entries(&self) -> PersistResult<Vec<TimelineEntry>> {
        self.query_entries(
            &format!("{ENTRY_SELECT_SQL} ORDER BY timestamp_ms ASC, seq ASC;"),
            None,
        )
    }

    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PersistResult<Vec<TimelineEntry>> {
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 WHERE timestamp_ms >= ?1 AND timestamp_ms < ?2
                 ORDER BY timestamp_ms ASC, seq ASC;"
            ),
            Some((start.timestamp_millis(), end.timestamp_millis())),
        )
    }
}

fn parse_uuid(text: &str, column: &str) -> PersistResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| PersistError::Decode(format!("invalid uuid value `{text}` in {column}")))
}

fn parse_millis(ms: i64, column: &str) -> PersistResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| PersistError::Decode(format!("invalid timestamp `{ms}` in {column}")))
}

fn parse_activity_row(row: &Row<'_>) -> PersistResult<LoggedActivity> {
    let entry_id = row
        .get::<_, Option<String>>(0)
        .map_err(PersistError::unavailable)?
        .map(|text| parse_uuid(&text, "activity_records.entry_uuid"))
        .transpose()?;
    let payload: String = row.get(1).map_err(PersistError::unavailable)?;
    let record: ActivityRecord = serde_json::from_str(&payload).map_err(|err| {
        PersistError::Decode(format!("invalid activity_records.payload: {err}"))
    })?;
    let recorded_at = parse_millis(
        row.get(2).map_err(PersistError::unavailable)?,
        "activity_records.recorded_at_ms",
    )?;
    Ok(LoggedActivity::new(entry_id, recorded_at, record))
}

fn parse_entry_row(row: &Row<'_>) -> PersistResult<TimelineEntry> {
    let uuid_text: String = row.get("uuid").map_err(PersistError::unavailable)?;
    let id = parse_uuid(&uuid_text, "timeline_entries.uuid")?;

    let category_text: String = row.get("category").map_err(PersistError::unavailable)?;
    let category = category_text
        .parse::<TimelineCategory>()
        .map_err(PersistError::Decode)?;

    let timestamp = parse_millis(
        row.get("timestamp_ms").map_err(PersistError::unavailable)?,
        "timeline_entries.timestamp_ms",
    )?;

    Ok(TimelineEntry::with_id(
        id,
        category,
        row.get::<_, String>("title").map_err(PersistError::unavailable)?,
        row.get::<_, String>("subtitle").map_err(PersistError::unavailable)?,
        row.get::<_, String>("icon").map_err(PersistError::unavailable)?,
        timestamp,
    ))
}

/// In-process timeline repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTimelineRepository {
    entries: RefCell<Vec<TimelineEntry>>,
    activities: RefCell<Vec<LoggedActivity>>,
}

impl MemoryTimelineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl TimelineRepository for MemoryTimelineRepository {
    fn append_entry(&self, entry: &TimelineEntry) -> PersistResult<()> {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|existing| existing.id() == entry.id()) {
            return Err(PersistError::Decode(format!(
                "duplicate timeline entry id {}",
                entry.id()
            )));
        }
        let index = entries.partition_point(|existing| existing.timestamp() <= entry.timestamp());
        entries.insert(index, entry.clone());
        Ok(())
    }

    fn append_activity(&self, activity: &LoggedActivity) -> PersistResult<()> {
        let mut activities = self.activities.borrow_mut();
        if let Some(entry_id) = activity.entry_id {
            if activities.iter().any(|existing| existing.entry_id == Some(entry_id)) {
                return Err(PersistError::Decode(format!(
                    "duplicate activity record for entry {entry_id}"
                )));
            }
        }
        activities.push(activity.clone());
        Ok(())
    }

    fn list_entries(&self) -> PersistResult<Vec<TimelineEntry>> {
        Ok(self.entries.borrow().clone())
    }

    fn list_activities(&self) -> PersistResult<Vec<LoggedActivity>> {
        Ok(self.activities.borrow().clone())
    }

    fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PersistResult<Vec<TimelineEntry>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.timestamp() >= start && entry.timestamp() < end)
            .cloned()
            .collect())
    }
}
