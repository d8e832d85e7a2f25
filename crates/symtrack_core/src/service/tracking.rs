//! Timeline use-cases.
//!
//! # Responsibility
//! - Own the in-memory `Timeline` aggregate and its repository.
//! - Turn validated activity records into timeline entries and keep the
//!   full records (notes, colors, untaken medications) next to them.
//!
//! # Invariants
//! - `append` always succeeds; persistence is best-effort and logged.
//! - Entries are persisted before observers are notified.
//! - An activity record is persisted after the entry it references.

use crate::model::activity::{
    ActivityRecord, FoodItem, LoggedActivity, MedicationItem, SleepLog, SymptomLog,
    TherapySession,
};
use crate::model::timeline::{
    DayEntries, EntryDraft, EntryId, Timeline, TimelineCategory, TimelineEntry,
};
use crate::repo::PersistError;
use crate::model::validation::ValidationError;
use crate::repo::timeline_repo::TimelineRepository;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use log::{error, info};

/// Source of "now" for default timestamps and date clamping.
pub type Clock = fn() -> DateTime<Utc>;

/// Timeline service over a repository implementation.
pub struct TrackingService<R: TimelineRepository> {
    timeline: Timeline,
    activities: Vec<LoggedActivity>,
    repo: R,
    last_persist_error: Option<String>,
    clock: Clock,
    observers: Vec<Box<dyn Fn(&TimelineEntry)>>,
}

impl<R: TimelineRepository> TrackingService<R> {
    /// Rebuilds the timeline from the repository.
    ///
    /// A failed read is logged and yields an empty timeline.
    pub fn load(repo: R) -> Self {
        let timeline = match repo.list_entries() {
            Ok(entries) => {
                let timeline = Timeline::from_entries(entries);
                info!(
                    "event=timeline_load module=tracking status=ok entry_count={}",
                    timeline.len()
                );
                timeline
            }
            Err(err) => {
                error!(
                    "event=timeline_load module=tracking status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Timeline::new()
            }
        };

        let activities = repo.list_activities().unwrap_or_else(|err| {
            error!(
                "event=activity_load module=tracking status=error error_code={} error={}",
                err.code(),
                err
            );
            Vec::new()
        });

        Self {
            timeline,
            activities,
            repo,
            last_persist_error: None,
            clock: Utc::now,
            observers: Vec::new(),
        }
    }

    /// Replaces the clock used for default timestamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Logged activity records, in logging order.
    pub fn activities(&self) -> &[LoggedActivity] {
        &self.activities
    }

    /// The record behind a timeline entry, when it was logged as an activity.
    pub fn activity_for(&self, entry_id: EntryId) -> Option<&LoggedActivity> {
        self.activities
            .iter()
            .find(|activity| activity.entry_id == Some(entry_id))
    }

    /// Error of the latest write that failed during the most recent append
    /// or log call; `None` when everything was stored.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Entries on `date` in the device-local timezone, oldest first.
    pub fn entries_for_day(&self, date: NaiveDate) -> DayEntries<'_, Local> {
        self.timeline.entries_for_day(date)
    }

    pub fn entries_for_day_in<Tz: TimeZone>(&self, tz: &Tz, date: NaiveDate) -> DayEntries<'_, Tz> {
        self.timeline.entries_for_day_in(tz, date)
    }

    /// Appends one entry at `timestamp`.
    pub fn append(
        &mut self,
        category: TimelineCategory,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> TimelineEntry {
        let entry = TimelineEntry::new(category, title, subtitle, icon, timestamp);
        self.last_persist_error = None;
        if let Err(err) = self.repo.append_entry(&entry) {
            error!(
                "event=timeline_append module=tracking status=error category={} error_code={} error={}",
                category,
                err.code(),
                err
            );
            self.last_persist_error = Some(describe(&err));
        }

        let entry = self.timeline.push(entry).clone();
        info!(
            "event=timeline_append module=tracking status=ok category={} entry_count={}",
            category,
            self.timeline.len()
        );
        for observer in &self.observers {
            observer(&entry);
        }
        entry
    }

    /// Appends one entry stamped with the current time.
    pub fn append_now(
        &mut self,
        category: TimelineCategory,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        icon: impl Into<String>,
    ) -> TimelineEntry {
        let now = (self.clock)();
        self.append(category, title, subtitle, icon, now)
    }

    pub fn append_draft(&mut self, draft: EntryDraft) -> TimelineEntry {
        let timestamp = draft.timestamp.unwrap_or_else(self.clock);
        self.append(draft.category, draft.title, draft.subtitle, draft.icon, timestamp)
    }

    pub fn log_food(&mut self, item: &FoodItem) -> Result<TimelineEntry, ValidationError> {
        let item = item.validated()?;
        let entry = self.append_draft(item.to_draft());
        self.record_activity(Some(entry.id()), ActivityRecord::Food(item));
        Ok(entry)
    }

    /// Logs a medication; untaken medications are recorded without an entry.
    pub fn log_medication(
        &mut self,
        item: &MedicationItem,
    ) -> Result<Option<TimelineEntry>, ValidationError> {
        let item = item.validated()?;
        self.last_persist_error = None;
        let entry = item.to_draft().map(|draft| self.append_draft(draft));
        self.record_activity(
            entry.as_ref().map(TimelineEntry::id),
            ActivityRecord::Medication(item),
        );
        Ok(entry)
    }

    pub fn log_symptom(&mut self, log: &SymptomLog) -> Result<TimelineEntry, ValidationError> {
        let log = log.validated((self.clock)())?;
        let entry = self.append_draft(log.to_draft());
        self.record_activity(Some(entry.id()), ActivityRecord::Symptom(log));
        Ok(entry)
    }

    pub fn log_sleep(&mut self, log: &SleepLog) -> Result<TimelineEntry, ValidationError> {
        let log = log.validated((self.clock)())?;
        let entry = self.append_draft(log.to_draft());
        self.record_activity(Some(entry.id()), ActivityRecord::Sleep(log));
        Ok(entry)
    }

    pub fn log_therapy(&mut self, session: &TherapySession) -> Result<TimelineEntry, ValidationError> {
        let session = session.validated((self.clock)())?;
        let entry = self.append_draft(session.to_draft());
        self.record_activity(Some(entry.id()), ActivityRecord::Therapy(session));
        Ok(entry)
    }

    fn record_activity(&mut self, entry_id: Option<EntryId>, record: ActivityRecord) {
        let activity = LoggedActivity::new(entry_id, (self.clock)(), record);
        if let Err(err) = self.repo.append_activity(&activity) {
            error!(
                "event=activity_append module=tracking status=error activity={} error_code={} error={}",
                activity.record.kind(),
                err.code(),
                err
            );
            self.last_persist_error = Some(describe(&err));
        }
        self.activities.push(activity);
    }

    /// Registers a callback run after every append.
    pub fn subscribe(&mut self, observer: impl Fn(&TimelineEntry) + 'static) {
        self.observers.push(Box::new(observer));
    }
}

fn describe(err: &PersistError) -> String {
    format!("{}: {err}", err.code())
}
