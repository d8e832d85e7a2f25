use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use symtrack_core::db::{open_db, open_db_in_memory};
use symtrack_core::{
    ActivityRecord, MedicationItem, SqliteTimelineRepository, SymptomLog, TimelineCategory,
    TimelineEntry, TimelineRepository, TrackingService,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 10, 18, 0, 0).unwrap()
}

#[test]
fn append_and_list_preserve_order_with_ties() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTimelineRepository::new(&conn);
    let noon = Utc.with_ymd_and_hms(2025, 9, 10, 12, 0, 0).unwrap();

    let later = TimelineEntry::new(TimelineCategory::Food, "Lunch: Salad", "320 calories", "🥗", noon);
    let tie = TimelineEntry::new(TimelineCategory::Rest, "Nap", "", "😴", noon);
    let earlier = TimelineEntry::new(
        TimelineCategory::Symptom,
        "Fatigue",
        "Severity: 7/10",
        "❤️‍🩹",
        noon - Duration::hours(3),
    );
    repo.append_entry(&later).unwrap();
    repo.append_entry(&tie).unwrap();
    repo.append_entry(&earlier).unwrap();

    let listed = repo.list_entries().unwrap();
    assert_eq!(listed, vec![earlier, later, tie]);
}

#[test]
fn list_between_is_half_open() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTimelineRepository::new(&conn);
    let start = Utc.with_ymd_and_hms(2025, 9, 10, 0, 0, 0).unwrap();
    let end = start + Duration::days(1);

    for timestamp in [start, start + Duration::hours(5), end] {
        repo.append_entry(&TimelineEntry::new(TimelineCategory::Therapy, "Yoga", "30 minutes", "🧠", timestamp))
            .unwrap();
    }

    let within = repo.list_entries_between(start, end).unwrap();
    assert_eq!(within.len(), 2);
    assert!(within.iter().all(|entry| entry.timestamp() < end));
}

#[test]
fn duplicate_entry_id_is_a_write_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTimelineRepository::new(&conn);
    let entry = TimelineEntry::new(TimelineCategory::Food, "Snacks: Apple", "95 calories", "🍎", Utc::now());

    repo.append_entry(&entry).unwrap();
    let err = repo.append_entry(&entry).unwrap_err();
    assert_eq!(err.code(), "write_failed");
}

#[test]
fn tracking_service_reloads_persisted_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeline.sqlite3");
    let t1 = Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap();
    let t2 = t1 + Duration::hours(2);

    let appended = {
        let conn = open_db(&path).unwrap();
        let mut service = TrackingService::load(SqliteTimelineRepository::new(&conn));
        vec![
            service.append(TimelineCategory::Symptom, "Fatigue", "Severity: 7/10", "❤️", t1),
            service.append(TimelineCategory::Medication, "Ibuprofen", "200mg", "💊", t2),
        ]
    };

    let conn = open_db(&path).unwrap();
    let service = TrackingService::load(SqliteTimelineRepository::new(&conn));
    let day: Vec<TimelineEntry> = service
        .entries_for_day_in(&Utc, t1.date_naive())
        .cloned()
        .collect();
    assert_eq!(day, appended);
}

#[test]
fn day_query_matches_in_memory_day_view() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTimelineRepository::new(&conn);
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let local_midnight = tz.with_ymd_and_hms(2025, 9, 10, 0, 0, 0).unwrap().with_timezone(&Utc);

    let mut service = TrackingService::load(&repo);
    for offset in [-1, 0, 12, 23, 24] {
        service.append(
            TimelineCategory::Rest,
            "Nap",
            "",
            "😴",
            local_midnight + Duration::hours(offset),
        );
    }

    let date = local_midnight.with_timezone(&tz).date_naive();
    let from_store = repo.list_entries_for_day_in(&tz, date).unwrap();
    let from_memory: Vec<TimelineEntry> = service.entries_for_day_in(&tz, date).cloned().collect();
    assert_eq!(from_store.len(), 3);
    assert_eq!(from_store, from_memory);
}

#[test]
fn activity_notes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activities.sqlite3");

    let (entry, untaken) = {
        let conn = open_db(&path).unwrap();
        let mut service =
            TrackingService::load(SqliteTimelineRepository::new(&conn)).with_clock(fixed_now);
        let entry = service
            .log_symptom(&SymptomLog {
                name: "Joint Pain".to_string(),
                severity: 6,
                notes: "  worse after stairs ".to_string(),
                timestamp: fixed_now() - Duration::hours(1),
            })
            .unwrap();
        let untaken = service
            .log_medication(&MedicationItem {
                name: "Methotrexate".to_string(),
                dosage: "15mg".to_string(),
                frequency: "Weekly".to_string(),
                icon: String::new(),
                color: "#FF9500".to_string(),
                is_taken: false,
            })
            .unwrap();
        assert!(service.last_persist_error().is_none());
        (entry, untaken)
    };
    assert!(untaken.is_none());

    let conn = open_db(&path).unwrap();
    let service = TrackingService::load(SqliteTimelineRepository::new(&conn));
    assert_eq!(service.activities().len(), 2);

    let symptom = service.activity_for(entry.id()).unwrap();
    assert_eq!(symptom.record.notes(), "worse after stairs");
    assert_eq!(symptom.recorded_at, fixed_now());

    let medication = &service.activities()[1];
    assert_eq!(medication.entry_id, None);
    match &medication.record {
        ActivityRecord::Medication(item) => {
            assert_eq!(item.frequency, "Weekly");
            assert_eq!(item.color, "#FF9500");
            assert!(!item.is_taken);
        }
        other => panic!("unexpected record: {other:?}"),
    }
}

#[test]
fn activity_for_unknown_entry_is_a_write_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTimelineRepository::new(&conn);
    let orphan = symtrack_core::LoggedActivity::new(
        Some(unsaved_entry().id()),
        fixed_now(),
        ActivityRecord::Symptom(SymptomLog {
            name: "Fatigue".to_string(),
            severity: 7,
            notes: String::new(),
            timestamp: fixed_now(),
        }),
    );

    let err = repo.append_activity(&orphan).unwrap_err();
    assert_eq!(err.code(), "write_failed");
    assert!(repo.list_activities().unwrap().is_empty());
}

fn unsaved_entry() -> TimelineEntry {
    TimelineEntry::new(TimelineCategory::Symptom, "Fatigue", "Severity: 7/10", "❤️", fixed_now())
}
