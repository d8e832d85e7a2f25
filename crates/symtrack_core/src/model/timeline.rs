//! Timeline entries and the append-only timeline aggregate.
//!
//! # Responsibility
//! - Define the immutable record of one logged activity.
//! - Keep the in-memory history ordered and expose day projections.
//!
//! # Invariants
//! - Entries are never updated or removed once appended.
//! - Storage order is `timestamp ASC`, ties broken by insertion order.
//! - Timestamps carry millisecond precision so persisted entries compare
//!   equal to their in-memory originals.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one timeline entry.
pub type EntryId = Uuid;

/// Kind of logged activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineCategory {
    Symptom,
    Medication,
    Food,
    Therapy,
    Rest,
}

impl TimelineCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symptom => "symptom",
            Self::Medication => "medication",
            Self::Food => "food",
            Self::Therapy => "therapy",
            Self::Rest => "rest",
        }
    }
}

impl Display for TimelineCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimelineCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "symptom" => Ok(Self::Symptom),
            "medication" => Ok(Self::Medication),
            "food" => Ok(Self::Food),
            "therapy" => Ok(Self::Therapy),
            "rest" => Ok(Self::Rest),
            other => Err(format!(
                "unknown timeline category `{other}`; expected symptom|medication|food|therapy|rest"
            )),
        }
    }
}

/// One immutable record of a logged activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    id: EntryId,
    category: TimelineCategory,
    title: String,
    subtitle: String,
    icon: String,
    timestamp: DateTime<Utc>,
}

impl TimelineEntry {
    /// Creates an entry with a freshly generated id.
    pub fn new(
        category: TimelineCategory,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), category, title, subtitle, icon, timestamp)
    }

    /// Rehydrates an entry whose identity already exists in storage.
    pub fn with_id(
        id: EntryId,
        category: TimelineCategory,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            category,
            title: title.into(),
            subtitle: subtitle.into(),
            icon: icon.into(),
            timestamp: truncate_to_millis(timestamp),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn category(&self) -> TimelineCategory {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar day of this entry in `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }
}

pub(crate) fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp.timestamp_millis())
        .single()
        .unwrap_or(timestamp)
}

/// UTC bounds `[start, end)` of the calendar day `date` in `tz`.
///
/// Matches `TimelineEntry::date_in`: an entry falls on `date` exactly when
/// its timestamp lies within the bounds.
pub fn day_bounds_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day_start_in(tz, date);
    let end = date
        .succ_opt()
        .map_or(DateTime::<Utc>::MAX_UTC, |next| day_start_in(tz, next));
    (start, end)
}

// Midnight may fall into a DST gap; the day then starts at the first
// representable local hour.
fn day_start_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(hour)))
                .earliest()
        })
        .map_or_else(|| midnight.and_utc(), |start| start.with_timezone(&Utc))
}

/// Not-yet-appended entry produced by activity projections.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub category: TimelineCategory,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    /// `None` means "now" at append time.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Append-only, chronologically ordered history of logged activities.
///
/// Read order is oldest first; `recent_first` gives the display order.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timeline from previously persisted entries.
    ///
    /// Input order is treated as insertion order for equal timestamps.
    pub fn from_entries(entries: impl IntoIterator<Item = TimelineEntry>) -> Self {
        let mut timeline = Self::new();
        for entry in entries {
            timeline.push(entry);
        }
        timeline
    }

    /// Creates and inserts a new entry. Always succeeds.
    pub fn append(
        &mut self,
        category: TimelineCategory,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> &TimelineEntry {
        self.push(TimelineEntry::new(category, title, subtitle, icon, timestamp))
    }

    /// Inserts an existing entry after every entry with an equal or
    /// earlier timestamp.
    pub fn push(&mut self, entry: TimelineEntry) -> &TimelineEntry {
        let index = self
            .entries
            .partition_point(|existing| existing.timestamp <= entry.timestamp);
        self.entries.insert(index, entry);
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }

    /// All entries, newest first.
    pub fn recent_first(&self) -> std::iter::Rev<std::slice::Iter<'_, TimelineEntry>> {
        self.entries.iter().rev()
    }

    pub fn get(&self, id: EntryId) -> Option<&TimelineEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries falling on `date` in the device-local timezone, oldest first.
    pub fn entries_for_day(&self, date: NaiveDate) -> DayEntries<'_, Local> {
        self.entries_for_day_in(&Local, date)
    }

    /// Entries falling on `date` in `tz`, oldest first.
    ///
    /// The returned iterator is lazy and `Clone`; calling this again without
    /// an intervening append yields the same sequence.
    pub fn entries_for_day_in<Tz: TimeZone>(&self, tz: &Tz, date: NaiveDate) -> DayEntries<'_, Tz> {
        DayEntries {
            inner: self.entries.iter(),
            tz: tz.clone(),
            date,
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy day projection over a timeline.
#[derive(Debug, Clone)]
pub struct DayEntries<'a, Tz: TimeZone> {
    inner: std::slice::Iter<'a, TimelineEntry>,
    tz: Tz,
    date: NaiveDate,
}

impl<'a, Tz: TimeZone> Iterator for DayEntries<'a, Tz> {
    type Item = &'a TimelineEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let tz = &self.tz;
        let date = self.date;
        self.inner.find(|entry| entry.date_in(tz) == date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
