use chrono::{Duration, Local, TimeZone, Utc};
use symtrack_core::db::open_db_in_memory;
use symtrack_core::{
    AppState, FoodItem, MemoryProfileStore, MemoryTimelineRepository, OnboardingStep,
    SelectionSet, SleepLog, SqliteAppState, TherapySession, TimelineCategory, TimelineEntry,
    UserProfile,
};

#[test]
fn empty_profile_toggle_scenario() {
    let mut app = AppState::load(MemoryProfileStore::new(), MemoryTimelineRepository::new());
    assert_eq!(app.selection.profile(), &UserProfile::new());

    app.selection.toggle(SelectionSet::Conditions, "Migraine");
    assert_eq!(
        app.selection.profile().conditions().iter().collect::<Vec<_>>(),
        vec!["Migraine"]
    );

    app.selection.toggle(SelectionSet::Conditions, "Migraine");
    assert!(app.selection.profile().conditions().is_empty());
}

#[test]
fn same_day_entries_are_returned_oldest_first() {
    let mut app = AppState::load(MemoryProfileStore::new(), MemoryTimelineRepository::new());
    let t1 = Local::now().with_timezone(&Utc);
    let t2 = t1 + Duration::milliseconds(1);

    let first = app
        .tracking
        .append(TimelineCategory::Symptom, "Fatigue", "Severity: 7/10", "❤️", t1);
    let second = app
        .tracking
        .append(TimelineCategory::Medication, "Ibuprofen", "200mg", "💊", t2);

    let today = t1.with_timezone(&Local).date_naive();
    let entries: Vec<&TimelineEntry> = app.tracking.entries_for_day(today).collect();
    if second.timestamp().with_timezone(&Local).date_naive() == today {
        assert_eq!(entries, vec![&first, &second]);
    } else {
        assert_eq!(entries, vec![&first]);
    }

    let again: Vec<&TimelineEntry> = app.tracking.entries_for_day(today).collect();
    assert_eq!(entries, again);
}

#[test]
fn full_onboarding_then_tracking_against_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 9, 10, 20, 0, 0).unwrap();

    {
        let mut app = SqliteAppState::open_sqlite(&conn);
        assert!(app.selection.show_onboarding());

        app.selection.advance();
        assert_eq!(app.selection.current_step(), OnboardingStep::Profile);
        app.selection.set_name("Jordan");
        app.selection.advance();
        app.selection.toggle(SelectionSet::Conditions, "Fibromyalgia");
        app.selection.advance();
        app.selection.select_with_severity("Muscle Pain", 6);
        while app.selection.current_step() != OnboardingStep::Summary {
            app.selection.advance();
        }
        app.selection.advance();
        assert!(!app.selection.show_onboarding());

        app.tracking
            .log_food(&FoodItem {
                name: "Banana, large".to_string(),
                calories: 121,
                icon: "🍌".to_string(),
                color: "#AF52DE".to_string(),
                meal_type: "Breakfast".to_string(),
            })
            .unwrap();
        app.tracking
            .log_sleep(&SleepLog {
                hours: 6.0,
                quality: 5,
                notes: String::new(),
                date: now - Duration::hours(12),
            })
            .unwrap();
        app.tracking
            .log_therapy(&TherapySession {
                kind: "Physical Therapy".to_string(),
                duration_minutes: 45,
                notes: String::new(),
                date: now - Duration::hours(2),
            })
            .unwrap();
    }

    let app = SqliteAppState::open_sqlite(&conn);
    assert_eq!(app.selection.profile().name(), "Jordan");
    assert!(!app.selection.show_onboarding());
    assert_eq!(app.tracking.timeline().len(), 3);

    let categories: Vec<TimelineCategory> = app
        .tracking
        .timeline()
        .iter()
        .map(TimelineEntry::category)
        .collect();
    assert!(categories.contains(&TimelineCategory::Food));
    assert!(categories.contains(&TimelineCategory::Rest));
    assert!(categories.contains(&TimelineCategory::Therapy));
}
