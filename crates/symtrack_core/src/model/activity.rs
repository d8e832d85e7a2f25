//! Tracked activity records and their timeline projections.
//!
//! Records are plain values: validated on the way in, projected into an
//! `EntryDraft`, then appended to the timeline. The full record, notes
//! included, is kept alongside as a `LoggedActivity`.

use crate::model::profile::Severity;
use crate::model::timeline::{truncate_to_millis, EntryDraft, EntryId, TimelineCategory};
use crate::model::validation::{
    clamp_calories, clamp_duration_minutes, clamp_quality, clamp_sleep_hours, clamp_timestamp,
    validate_name, validate_text, ValidationError, LABEL_MAX_CHARS, NOTES_MAX_CHARS,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SYMPTOM_ICON: &str = "❤️‍🩹";
pub const SLEEP_ICON: &str = "😴";
pub const THERAPY_ICON: &str = "🧠";
pub const DEFAULT_FOOD_ICON: &str = "🍎";
pub const DEFAULT_MEDICATION_ICON: &str = "💊";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: i64,
    pub icon: String,
    /// Opaque display color, e.g. `#FF3B30`.
    pub color: String,
    pub meal_type: String,
}

impl FoodItem {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("food name", &self.name)?,
            calories: i64::from(clamp_calories(self.calories)),
            icon: non_empty_or(&self.icon, DEFAULT_FOOD_ICON),
            color: self.color.clone(),
            meal_type: validate_text("meal type", &self.meal_type, 50, false)?,
        })
    }

    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            category: TimelineCategory::Food,
            title: format!("{}: {}", self.meal_type, self.name),
            subtitle: format!("{} calories", self.calories),
            icon: self.icon.clone(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationItem {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub icon: String,
    pub color: String,
    pub is_taken: bool,
}

impl MedicationItem {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("medication name", &self.name)?,
            dosage: validate_text("dosage", &self.dosage, LABEL_MAX_CHARS, false)?,
            frequency: validate_text("frequency", &self.frequency, LABEL_MAX_CHARS, false)?,
            icon: non_empty_or(&self.icon, DEFAULT_MEDICATION_ICON),
            color: self.color.clone(),
            is_taken: self.is_taken,
        })
    }

    /// Only taken medications appear on the timeline.
    pub fn to_draft(&self) -> Option<EntryDraft> {
        if !self.is_taken {
            return None;
        }
        Some(EntryDraft {
            category: TimelineCategory::Medication,
            title: self.name.clone(),
            subtitle: format!("{} - {}", self.dosage, self.frequency),
            icon: self.icon.clone(),
            timestamp: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomLog {
    pub name: String,
    pub severity: i64,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl SymptomLog {
    pub fn validated(&self, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("symptom name", &self.name)?,
            severity: i64::from(Severity::clamped(self.severity).value()),
            notes: validate_text("notes", &self.notes, NOTES_MAX_CHARS, true)?,
            timestamp: clamp_timestamp(self.timestamp, now),
        })
    }

    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            category: TimelineCategory::Symptom,
            title: self.name.clone(),
            subtitle: format!("Severity: {}/10", self.severity),
            icon: SYMPTOM_ICON.to_string(),
            timestamp: Some(self.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLog {
    pub hours: f64,
    pub quality: i64,
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl SleepLog {
    pub fn validated(&self, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            hours: clamp_sleep_hours(self.hours),
            quality: i64::from(clamp_quality(self.quality)),
            notes: validate_text("notes", &self.notes, NOTES_MAX_CHARS, true)?,
            date: clamp_timestamp(self.date, now),
        })
    }

    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            category: TimelineCategory::Rest,
            title: "Sleep Log".to_string(),
            subtitle: format!("{:?} hours, Quality: {}/10", self.hours, self.quality),
            icon: SLEEP_ICON.to_string(),
            timestamp: Some(self.date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapySession {
    /// Therapy type label, e.g. "Physical Therapy".
    pub kind: String,
    pub duration_minutes: i64,
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl TherapySession {
    pub fn validated(&self, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            kind: validate_text("therapy type", &self.kind, LABEL_MAX_CHARS, false)?,
            duration_minutes: i64::from(clamp_duration_minutes(self.duration_minutes)),
            notes: validate_text("notes", &self.notes, NOTES_MAX_CHARS, true)?,
            date: clamp_timestamp(self.date, now),
        })
    }

    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            category: TimelineCategory::Therapy,
            title: self.kind.clone(),
            subtitle: format!("{} minutes", self.duration_minutes),
            icon: THERAPY_ICON.to_string(),
            timestamp: Some(self.date),
        }
    }
}

/// Any validated activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum ActivityRecord {
    Food(FoodItem),
    Medication(MedicationItem),
    Symptom(SymptomLog),
    Sleep(SleepLog),
    Therapy(TherapySession),
}

impl ActivityRecord {
    pub const KINDS: [&'static str; 5] = ["food", "medication", "symptom", "sleep", "therapy"];

    /// Stable storage/wire name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Food(_) => "food",
            Self::Medication(_) => "medication",
            Self::Symptom(_) => "symptom",
            Self::Sleep(_) => "sleep",
            Self::Therapy(_) => "therapy",
        }
    }

    /// Free-text notes, empty for records without any.
    pub fn notes(&self) -> &str {
        match self {
            Self::Symptom(log) => &log.notes,
            Self::Sleep(log) => &log.notes,
            Self::Therapy(session) => &session.notes,
            Self::Food(_) | Self::Medication(_) => "",
        }
    }
}

/// A logged record and the timeline entry it produced, if any.
///
/// Untaken medications are kept with `entry_id == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedActivity {
    pub entry_id: Option<EntryId>,
    pub recorded_at: DateTime<Utc>,
    pub record: ActivityRecord,
}

impl LoggedActivity {
    /// `recorded_at` is truncated to milliseconds, the storage precision.
    pub fn new(entry_id: Option<EntryId>, recorded_at: DateTime<Utc>, record: ActivityRecord) -> Self {
        Self {
            entry_id,
            recorded_at: truncate_to_millis(recorded_at),
            record,
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
