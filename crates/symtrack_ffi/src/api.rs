//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection to the process-wide database path.
//! - Calls touching user state are serialized so profile writes never
//!   interleave.
//! - State is reloaded per call, so a change whose write failed is reported
//!   as `ok=false`: it would be gone on the next call.

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{error, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use symtrack_core::db::open_db;
use symtrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, FoodItem, LoggedActivity, MedicationItem, ProfileField, SelectionSet, SleepLog,
    SqliteAppState, SqliteTimelineRepository, SymptomLog, TherapySession, TimelineEntry,
    TimelineRepository, UserProfile,
};

const RECENT_DEFAULT_LIMIT: u32 = 50;
const RECENT_LIMIT_MAX: u32 = 200;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STATE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One symptom with its recorded severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomSeverityItem {
    pub symptom: String,
    pub level: u8,
}

/// Flat profile projection for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub conditions: Vec<String>,
    pub symptoms: Vec<String>,
    pub symptom_severity: Vec<SymptomSeverityItem>,
    /// `episodic|constant|variable`, or `None` when unset.
    pub flare_pattern: Option<String>,
    pub triggers: Vec<String>,
    pub routines: Vec<String>,
    pub goals: Vec<String>,
    pub onboarding_completed: bool,
}

/// Profile response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    /// Current profile; `None` only when the database could not be opened.
    pub profile: Option<ProfileView>,
    pub message: String,
}

/// Response envelope for selection and profile edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResponse {
    pub ok: bool,
    /// Membership after the call, when the call targets one value.
    pub selected: Option<bool>,
    /// Stored severity after the call, when the call targets a symptom.
    pub severity: Option<u8>,
    pub message: String,
}

impl SelectionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            selected: None,
            severity: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            selected: None,
            severity: None,
            message: message.into(),
        }
    }

    fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    fn with_severity(mut self, severity: u8) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Timeline row projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    pub entry_id: String,
    /// `symptom|medication|food|therapy|rest`.
    pub category: String,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    pub timestamp_ms: i64,
}

/// Timeline listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineResponse {
    pub ok: bool,
    pub items: Vec<TimelineItem>,
    pub message: String,
}

impl TimelineResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Full record behind a logged activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
    /// Timeline entry produced by the activity; `None` for untaken medications.
    pub entry_id: Option<String>,
    /// `food|medication|symptom|sleep|therapy`.
    pub activity: String,
    pub notes: String,
    pub recorded_at_ms: i64,
    /// The whole record as JSON, tagged by `activity`.
    pub record_json: String,
}

/// Activity lookup envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResponse {
    pub ok: bool,
    pub items: Vec<ActivityView>,
    pub message: String,
}

impl ActivityResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Generic action response envelope for logging activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Appended entry, when one was created.
    pub entry: Option<TimelineItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, entry: Option<&TimelineEntry>) -> Self {
        Self {
            ok: true,
            entry: entry.map(to_timeline_item),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry: None,
            message: message.into(),
        }
    }
}

/// Returns the stored profile, or an empty one on first launch.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_get() -> ProfileResponse {
    match with_app_state(|state| to_profile_view(state.selection.profile())) {
        Ok(profile) => ProfileResponse {
            ok: true,
            profile: Some(profile),
            message: "Profile loaded.".to_string(),
        },
        Err(err) => ProfileResponse {
            ok: false,
            profile: None,
            message: format!("profile_get failed: {err}"),
        },
    }
}

/// Flips membership of `value` in the named selection set.
///
/// `set` accepts `conditions|symptoms|triggers|routines|goals`.
#[flutter_rust_bridge::frb(sync)]
pub fn selection_toggle(set: String, value: String) -> SelectionResponse {
    let set = match set.parse::<SelectionSet>() {
        Ok(set) => set,
        Err(err) => return SelectionResponse::failure(format!("selection_toggle failed: {err}")),
    };
    match with_app_state(|state| state.selection.toggle(set, &value)) {
        Ok(selected) => SelectionResponse::success("Selection updated.").with_selected(selected),
        Err(err) => SelectionResponse::failure(format!("selection_toggle failed: {err}")),
    }
}

/// Adds a user-entered option to the named set.
#[flutter_rust_bridge::frb(sync)]
pub fn selection_add_custom(set: String, value: String) -> SelectionResponse {
    let set = match set.parse::<SelectionSet>() {
        Ok(set) => set,
        Err(err) => {
            return SelectionResponse::failure(format!("selection_add_custom failed: {err}"))
        }
    };
    match with_app_state(|state| state.selection.add_custom(set, &value)).and_then(flatten) {
        Ok(normalized) => {
            SelectionResponse::success(format!("Added `{normalized}`.")).with_selected(true)
        }
        Err(err) => {
            SelectionResponse::failure(format!("selection_add_custom failed: {err}"))
        }
    }
}

/// Records severity for an already selected symptom.
///
/// Levels outside `1..=10` are clamped. Unselected symptoms are reported as
/// `ok=false` and left untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn severity_set(symptom: String, level: i64) -> SelectionResponse {
    match with_app_state(|state| state.selection.set_severity(&symptom, level)) {
        Ok(Some(severity)) => SelectionResponse::success("Severity recorded.")
            .with_selected(true)
            .with_severity(severity.value()),
        Ok(None) => SelectionResponse::failure("severity_set failed: symptom is not selected")
            .with_selected(false),
        Err(err) => SelectionResponse::failure(format!("severity_set failed: {err}")),
    }
}

/// Selects `symptom` when needed and records its severity.
///
/// A blank symptom is rejected with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn severity_select(symptom: String, level: i64) -> SelectionResponse {
    match with_app_state(|state| state.selection.select_with_severity(&symptom, level)) {
        Ok(Some(severity)) => SelectionResponse::success("Severity recorded.")
            .with_selected(true)
            .with_severity(severity.value()),
        Ok(None) => SelectionResponse::failure("severity_select failed: symptom is empty"),
        Err(err) => SelectionResponse::failure(format!("severity_select failed: {err}")),
    }
}

/// Replaces a scalar profile field (`name|flare_pattern`).
///
/// An unknown flare pattern clears the stored pattern.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_set_scalar(field: String, value: String) -> SelectionResponse {
    let field = match field.parse::<ProfileField>() {
        Ok(field) => field,
        Err(err) => return SelectionResponse::failure(format!("profile_set_scalar failed: {err}")),
    };
    match with_app_state(|state| state.selection.set_scalar(field, &value)) {
        Ok(()) => SelectionResponse::success("Profile updated."),
        Err(err) => SelectionResponse::failure(format!("profile_set_scalar failed: {err}")),
    }
}

/// Marks onboarding as finished.
#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_complete() -> SelectionResponse {
    match with_app_state(|state| state.selection.complete_onboarding()) {
        Ok(()) => SelectionResponse::success("Onboarding completed."),
        Err(err) => SelectionResponse::failure(format!("onboarding_complete failed: {err}")),
    }
}

/// Clears every profile answer and re-enables onboarding.
#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_reset() -> SelectionResponse {
    match with_app_state(|state| state.selection.reset_onboarding()) {
        Ok(()) => SelectionResponse::success("Onboarding reset."),
        Err(err) => SelectionResponse::failure(format!("onboarding_reset failed: {err}")),
    }
}

/// Logs a food item stamped with the current time.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_log_food(
    name: String,
    calories: i64,
    icon: String,
    color: String,
    meal_type: String,
) -> EntryActionResponse {
    let item = FoodItem {
        name,
        calories,
        icon,
        color,
        meal_type,
    };
    match with_app_state(|state| state.tracking.log_food(&item)).and_then(flatten) {
        Ok(entry) => EntryActionResponse::success("Food logged.", Some(&entry)),
        Err(err) => {
            EntryActionResponse::failure(format!("timeline_log_food failed: {err}"))
        }
    }
}

/// Logs a medication; an untaken medication succeeds without an entry.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_log_medication(
    name: String,
    dosage: String,
    frequency: String,
    icon: String,
    color: String,
    is_taken: bool,
) -> EntryActionResponse {
    let item = MedicationItem {
        name,
        dosage,
        frequency,
        icon,
        color,
        is_taken,
    };
    match with_app_state(|state| state.tracking.log_medication(&item)).and_then(flatten) {
        Ok(Some(entry)) => EntryActionResponse::success("Medication logged.", Some(&entry)),
        Ok(None) => EntryActionResponse::success("Medication not taken; nothing logged.", None),
        Err(err) => {
            EntryActionResponse::failure(format!("timeline_log_medication failed: {err}"))
        }
    }
}

/// Logs a symptom occurrence at `timestamp_ms`, or now when omitted.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_log_symptom(
    name: String,
    severity: i64,
    notes: String,
    timestamp_ms: Option<i64>,
) -> EntryActionResponse {
    let timestamp = match resolve_timestamp(timestamp_ms) {
        Ok(timestamp) => timestamp,
        Err(err) => return EntryActionResponse::failure(format!("timeline_log_symptom failed: {err}")),
    };
    let log = SymptomLog {
        name,
        severity,
        notes,
        timestamp,
    };
    match with_app_state(|state| state.tracking.log_symptom(&log)).and_then(flatten) {
        Ok(entry) => EntryActionResponse::success("Symptom logged.", Some(&entry)),
        Err(err) => {
            EntryActionResponse::failure(format!("timeline_log_symptom failed: {err}"))
        }
    }
}

/// Logs a night of sleep dated `date_ms`, or now when omitted.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_log_sleep(
    hours: f64,
    quality: i64,
    notes: String,
    date_ms: Option<i64>,
) -> EntryActionResponse {
    let date = match resolve_timestamp(date_ms) {
        Ok(date) => date,
        Err(err) => return EntryActionResponse::failure(format!("timeline_log_sleep failed: {err}")),
    };
    let log = SleepLog {
        hours,
        quality,
        notes,
        date,
    };
    match with_app_state(|state| state.tracking.log_sleep(&log)).and_then(flatten) {
        Ok(entry) => EntryActionResponse::success("Sleep logged.", Some(&entry)),
        Err(err) => {
            EntryActionResponse::failure(format!("timeline_log_sleep failed: {err}"))
        }
    }
}

/// Logs a therapy session dated `date_ms`, or now when omitted.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_log_therapy(
    kind: String,
    duration_minutes: i64,
    notes: String,
    date_ms: Option<i64>,
) -> EntryActionResponse {
    let date = match resolve_timestamp(date_ms) {
        Ok(date) => date,
        Err(err) => {
            return EntryActionResponse::failure(format!("timeline_log_therapy failed: {err}"))
        }
    };
    let session = TherapySession {
        kind,
        duration_minutes,
        notes,
        date,
    };
    match with_app_state(|state| state.tracking.log_therapy(&session)).and_then(flatten) {
        Ok(entry) => EntryActionResponse::success("Therapy logged.", Some(&entry)),
        Err(err) => {
            EntryActionResponse::failure(format!("timeline_log_therapy failed: {err}"))
        }
    }
}

/// Lists entries for a device-local day, oldest first.
///
/// `date` is `YYYY-MM-DD`; `None` means today.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_for_day(date: Option<String>) -> TimelineResponse {
    let date = match date.as_deref().map(str::trim) {
        None | Some("") => Local::now().date_naive(),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(err) => {
                return TimelineResponse::failure(format!(
                    "timeline_for_day failed: invalid date `{raw}`: {err}"
                ))
            }
        },
    };

    let listed = with_connection(|conn| {
        SqliteTimelineRepository::new(conn).list_entries_for_day_in(&Local, date)
    })
    .and_then(flatten);
    match listed {
        Ok(entries) => {
            let items = entries.iter().map(to_timeline_item).collect::<Vec<_>>();
            TimelineResponse {
            ok: true,
                message: format!("{} entr(y/ies) on {date}.", items.len()),
                items,
            }
        }
        Err(err) => TimelineResponse::failure(format!("timeline_for_day failed: {err}")),
    }
}

/// Lists the most recent entries, newest first.
///
/// `limit` defaults to 50 and is capped at 200.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_recent(limit: Option<u32>) -> TimelineResponse {
    let limit = normalize_recent_limit(limit);
    match with_app_state(|state| {
        state
            .tracking
            .timeline()
            .recent_first()
            .take(limit as usize)
            .map(to_timeline_item)
            .collect::<Vec<_>>()
    }) {
        Ok(items) => TimelineResponse {
            ok: true,
            message: format!("{} recent entr(y/ies).", items.len()),
            items,
        },
        Err(err) => TimelineResponse::failure(format!("timeline_recent failed: {err}")),
    }
}

/// Returns the full record behind one timeline entry, notes included.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_entry_activity(entry_id: String) -> ActivityResponse {
    let found = with_app_state(|state| {
        state
            .tracking
            .activities()
            .iter()
            .filter(|activity| {
                activity
                    .entry_id
                    .is_some_and(|id| id.to_string() == entry_id.trim())
            })
            .map(to_activity_view)
            .collect::<Result<Vec<_>, _>>()
    })
    .and_then(flatten);
    match found {
        Ok(items) if items.is_empty() => ActivityResponse::failure(format!(
            "timeline_entry_activity failed: no activity for entry `{}`",
            entry_id.trim()
        )),
        Ok(items) => ActivityResponse {
            ok: true,
            items,
            message: "Activity found.".to_string(),
        },
        Err(err) => ActivityResponse::failure(format!("timeline_entry_activity failed: {err}")),
    }
}

/// Lists the most recently logged activity records, newest first, including
/// untaken medications.
#[flutter_rust_bridge::frb(sync)]
pub fn activities_recent(limit: Option<u32>) -> ActivityResponse {
    let limit = normalize_recent_limit(limit);
    let listed = with_app_state(|state| {
        state
            .tracking
            .activities()
            .iter()
            .rev()
            .take(limit as usize)
            .map(to_activity_view)
            .collect::<Result<Vec<_>, _>>()
    })
    .and_then(flatten);
    match listed {
        Ok(items) => ActivityResponse {
            ok: true,
            message: format!("{} recent activit(y/ies).", items.len()),
            items,
        },
        Err(err) => ActivityResponse::failure(format!("activities_recent failed: {err}")),
    }
}

fn normalize_recent_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => RECENT_DEFAULT_LIMIT,
        Some(value) if value > RECENT_LIMIT_MAX => RECENT_LIMIT_MAX,
        Some(value) => value,
    }
}

fn flatten<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}

fn resolve_timestamp(timestamp_ms: Option<i64>) -> Result<DateTime<Utc>, String> {
    match timestamp_ms {
        None => Ok(Utc::now()),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| format!("timestamp {ms} is out of range")),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if cfg!(test) {
                return std::env::temp_dir()
                    .join(format!("symtrack_ffi_test_{}.sqlite3", std::process::id()));
            }
            let config = CoreConfig::from_env();
            if let Err(err) = config.ensure_db_parent() {
                error!("event=db_path_resolve module=ffi status=error error={}", err);
            }
            config.db_path
        })
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> T) -> Result<T, String> {
    let _guard = STATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        error!(
            "event=db_open module=ffi status=error path={} error={}",
            db_path.display(),
            err
        );
        format!("database open failed: {err}")
    })?;
    Ok(f(&conn))
}

/// Runs `f` against freshly loaded state and fails when any write it
/// triggered did not reach the database.
fn with_app_state<T>(f: impl FnOnce(&mut SqliteAppState<'_>) -> T) -> Result<T, String> {
    with_connection(|conn| {
        let mut state = SqliteAppState::open_sqlite(conn);
        let output = f(&mut state);
        let unsaved = state
            .selection
            .last_save_error()
            .or(state.tracking.last_persist_error());
        match unsaved {
            Some(err) => {
                warn!("event=ffi_call module=ffi status=error reason=unsaved_change");
                Err(format!("change was not saved: {err}"))
            }
            None => Ok(output),
        }
    })?
}

fn to_profile_view(profile: &UserProfile) -> ProfileView {
    let owned = |set: SelectionSet| profile.selections(set).iter().cloned().collect::<Vec<_>>();
    ProfileView {
        name: profile.name().to_string(),
        conditions: owned(SelectionSet::Conditions),
        symptoms: owned(SelectionSet::Symptoms),
        symptom_severity: profile
            .symptom_severity()
            .iter()
            .map(|(symptom, severity)| SymptomSeverityItem {
                symptom: symptom.clone(),
                level: severity.value(),
            })
            .collect(),
        flare_pattern: profile
            .flare_pattern()
            .map(|pattern| pattern.as_str().to_string()),
        triggers: owned(SelectionSet::Triggers),
        routines: owned(SelectionSet::Routines),
        goals: owned(SelectionSet::Goals),
        onboarding_completed: profile.onboarding_completed(),
    }
}

fn to_activity_view(activity: &LoggedActivity) -> Result<ActivityView, serde_json::Error> {
    Ok(ActivityView {
        entry_id: activity.entry_id.map(|id| id.to_string()),
        activity: activity.record.kind().to_string(),
        notes: activity.record.notes().to_string(),
        recorded_at_ms: activity.recorded_at.timestamp_millis(),
        record_json: serde_json::to_string(&activity.record)?,
    })
}

fn to_timeline_item(entry: &TimelineEntry) -> TimelineItem {
    TimelineItem {
        entry_id: entry.id().to_string(),
        category: entry.category().as_str().to_string(),
        title: entry.title().to_string(),
        subtitle: entry.subtitle().to_string(),
        icon: entry.icon().to_string(),
        timestamp_ms: entry.timestamp().timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let value = unique_token("Condition");
        let first = selection_toggle("conditions".to_string(), value.clone());
        assert!(first.ok, "{}", first.message);
        assert_eq!(first.selected, Some(true));
        assert!(profile_get().profile.unwrap().conditions.contains(&value));

        let second = selection_toggle("conditions".to_string(), value.clone());
        assert_eq!(second.selected, Some(false));
        assert!(!profile_get().profile.unwrap().conditions.contains(&value));
    }

    #[test]
    fn toggle_rejects_unknown_set() {
        let response = selection_toggle("moods".to_string(), "Happy".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("moods"));
    }

    #[test]
    fn severity_requires_selection_unless_combined() {
        let symptom = unique_token("Symptom");
        let rejected = severity_set(symptom.clone(), 5);
        assert!(!rejected.ok);
        assert_eq!(rejected.selected, Some(false));

        let selected = severity_select(symptom.clone(), 42);
        assert!(selected.ok, "{}", selected.message);
        assert_eq!(selected.severity, Some(10));

        let updated = severity_set(symptom.clone(), 3);
        assert_eq!(updated.severity, Some(3));

        let profile = profile_get().profile.unwrap();
        assert!(profile
            .symptom_severity
            .iter()
            .any(|item| item.symptom == symptom && item.level == 3));
    }

    #[test]
    fn add_custom_rejects_blank_value() {
        let response = selection_add_custom("goals".to_string(), "   ".to_string());
        assert!(!response.ok);
    }

    #[test]
    fn logged_symptom_appears_in_its_day() {
        let name = unique_token("Ache");
        let at = Local::now().with_timezone(&Utc);
        let logged = timeline_log_symptom(name.clone(), 4, String::new(), Some(at.timestamp_millis()));
        assert!(logged.ok, "{}", logged.message);
        let entry = logged.entry.unwrap();
        assert_eq!(entry.subtitle, "Severity: 4/10");

        let day = at.with_timezone(&Local).format("%Y-%m-%d").to_string();
        let listed = timeline_for_day(Some(day));
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|item| item.entry_id == entry.entry_id));
    }

    #[test]
    fn severity_select_rejects_blank_symptom() {
        let response = severity_select("   ".to_string(), 5);
        assert!(!response.ok);
        assert!(!profile_get()
            .profile
            .unwrap()
            .symptoms
            .iter()
            .any(|symptom| symptom.trim().is_empty()));
    }

    #[test]
    fn symptom_notes_are_readable_after_logging() {
        let name = unique_token("Cramp");
        let logged = timeline_log_symptom(name, 6, "after long walk".to_string(), None);
        assert!(logged.ok, "{}", logged.message);
        let entry_id = logged.entry.unwrap().entry_id;

        let found = timeline_entry_activity(entry_id.clone());
        assert!(found.ok, "{}", found.message);
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].activity, "symptom");
        assert_eq!(found.items[0].notes, "after long walk");
        assert_eq!(found.items[0].entry_id.as_deref(), Some(entry_id.as_str()));
    }

    #[test]
    fn untaken_medication_logs_nothing() {
        let name = unique_token("Med");
        let response = timeline_log_medication(
            name.clone(),
            "10mg".to_string(),
            "Daily".to_string(),
            "💊".to_string(),
            "#007AFF".to_string(),
            false,
        );
        assert!(response.ok, "{}", response.message);
        assert!(response.entry.is_none());

        let recent = activities_recent(Some(RECENT_LIMIT_MAX));
        assert!(recent.ok, "{}", recent.message);
        assert!(recent
            .items
            .iter()
            .any(|item| item.entry_id.is_none() && item.record_json.contains(&name)));
    }

    #[test]
    fn timeline_for_day_rejects_malformed_date() {
        let response = timeline_for_day(Some("2025-13-40".to_string()));
        assert!(!response.ok);
        assert!(response.items.is_empty());
    }

    #[test]
    fn recent_limit_is_normalized() {
        assert_eq!(normalize_recent_limit(None), RECENT_DEFAULT_LIMIT);
        assert_eq!(normalize_recent_limit(Some(0)), RECENT_DEFAULT_LIMIT);
        assert_eq!(normalize_recent_limit(Some(1_000)), RECENT_LIMIT_MAX);
        assert_eq!(normalize_recent_limit(Some(7)), 7);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
