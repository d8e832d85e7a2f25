//! SymTrack CLI
//!
//! Command-line front end over a local SymTrack database:
//! - Edit profile selections and onboarding state
//! - Log food, medication, symptoms, sleep, and therapy
//! - Inspect the daily timeline and the built-in catalogs

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use symtrack_core::db::open_db;
use symtrack_core::model::activity::{DEFAULT_FOOD_ICON, DEFAULT_MEDICATION_ICON};
use symtrack_core::model::catalog::{catalog_for, MEAL_TYPES, TREATMENTS};
use symtrack_core::{
    init_logging_from_config, CoreConfig, FoodItem, LoggedActivity, MedicationItem, ProfileField,
    SelectionSet, SleepLog, SqliteAppState, SymptomLog, TherapySession, TimelineEntry, UserProfile,
};

#[derive(Parser)]
#[command(name = "symtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chronic illness symptom tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (default: $SYMTRACK_DB_PATH or the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored profile
    Profile,

    /// Select or deselect a value (conditions, symptoms, triggers, routines, goals)
    Toggle { set: SelectionSet, value: String },

    /// Add a custom value to a selection set
    AddCustom { set: SelectionSet, value: String },

    /// Record severity (1-10) for a symptom
    Severity {
        symptom: String,
        level: i64,
        /// Select the symptom first when it is not selected yet
        #[arg(long)]
        select: bool,
    },

    /// Set a scalar profile field (name, flare_pattern)
    Set { field: ProfileField, value: String },

    /// Complete or reset onboarding
    Onboarding {
        #[command(subcommand)]
        action: OnboardingAction,
    },

    /// Log an activity onto the timeline
    Log {
        #[command(subcommand)]
        activity: LogCommand,
    },

    /// List timeline entries for one day, oldest first
    Timeline {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// List every entry instead of one day
        #[arg(long, conflicts_with = "date")]
        all: bool,
    },

    /// Show full records of recently logged activities, notes included
    Activities {
        /// How many records to show, newest first
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print built-in option lists
    Catalog {
        /// Selection set, `treatments`, or `meals` (default: all)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum OnboardingAction {
    Complete,
    Reset,
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// Log a food item
    Food {
        name: String,
        calories: i64,
        /// Breakfast, Lunch, Dinner, or Snacks
        #[arg(short, long, default_value = "Snacks")]
        meal: String,
        #[arg(long, default_value = DEFAULT_FOOD_ICON)]
        icon: String,
    },
    /// Log a medication dose
    Medication {
        name: String,
        dosage: String,
        #[arg(short, long, default_value = "As needed")]
        frequency: String,
        /// Record the medication without taking it (no timeline entry)
        #[arg(long)]
        not_taken: bool,
    },
    /// Log a symptom occurrence
    Symptom {
        name: String,
        severity: i64,
        #[arg(short, long, default_value = "")]
        notes: String,
        /// "now", "yesterday", RFC 3339, or Unix milliseconds
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Log a night of sleep
    Sleep {
        hours: f64,
        quality: i64,
        #[arg(short, long, default_value = "")]
        notes: String,
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Log a therapy session
    Therapy {
        kind: String,
        minutes: i64,
        #[arg(short, long, default_value = "")]
        notes: String,
        #[arg(short, long)]
        time: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config = config.with_db_path(db);
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    if let Commands::Catalog { name } = &cli.command {
        return print_catalog(name.as_deref(), cli.json);
    }

    config.ensure_db_parent()?;
    let conn = open_db(&config.db_path)?;
    let mut state = SqliteAppState::open_sqlite(&conn);

    match cli.command {
        Commands::Profile => print_profile(state.selection.profile(), cli.json)?,
        Commands::Toggle { set, value } => {
            let selected = state.selection.toggle(set, &value);
            println!(
                "{} `{value}` {} {set}",
                if selected { "Selected" } else { "Deselected" },
                if selected { "in" } else { "from" }
            );
        }
        Commands::AddCustom { set, value } => {
            let added = state.selection.add_custom(set, &value)?;
            println!("Added `{added}` to {set}");
        }
        Commands::Severity {
            symptom,
            level,
            select,
        } => {
            let severity = if select {
                state.selection.select_with_severity(&symptom, level)
            } else {
                state.selection.set_severity(&symptom, level)
            };
            match severity {
                Some(severity) => println!("{symptom}: {severity}/10"),
                None if symptom.trim().is_empty() => return Err("symptom is empty".into()),
                None => {
                    return Err(format!(
                        "`{symptom}` is not a selected symptom; pass --select to add it"
                    )
                    .into())
                }
            }
        }
        Commands::Set { field, value } => {
            state.selection.set_scalar(field, &value);
            print_profile(state.selection.profile(), cli.json)?;
        }
        Commands::Onboarding { action } => match action {
            OnboardingAction::Complete => {
                state.selection.complete_onboarding();
                println!("Onboarding completed");
            }
            OnboardingAction::Reset => {
                state.selection.reset_onboarding();
                println!("Onboarding reset");
            }
        },
        Commands::Log { activity } => {
            let entry = log_activity(&mut state, activity)?;
            match entry {
                Some(entry) => print_entries([&entry], cli.json)?,
                None => println!("Medication not taken; nothing logged"),
            }
        }
        Commands::Timeline { date, all } => {
            let timeline = state.tracking.timeline();
            if all {
                print_entries(timeline.iter(), cli.json)?;
            } else {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                print_entries(timeline.entries_for_day(date), cli.json)?;
            }
        }
        Commands::Activities { limit } => {
            let recent: Vec<&LoggedActivity> =
                state.tracking.activities().iter().rev().take(limit).collect();
            print_activities(&recent, cli.json)?;
        }
        Commands::Catalog { .. } => {}
    }

    let unsaved = state
        .selection
        .last_save_error()
        .or(state.tracking.last_persist_error());
    if let Some(err) = unsaved {
        return Err(format!("change was not saved: {err}").into());
    }
    Ok(())
}

fn log_activity(
    state: &mut SqliteAppState<'_>,
    activity: LogCommand,
) -> Result<Option<TimelineEntry>, Box<dyn Error>> {
    let tracking = &mut state.tracking;
    let entry = match activity {
        LogCommand::Food {
            name,
            calories,
            meal,
            icon,
        } => Some(tracking.log_food(&FoodItem {
            name,
            calories,
            icon,
            color: String::new(),
            meal_type: meal,
        })?),
        LogCommand::Medication {
            name,
            dosage,
            frequency,
            not_taken,
        } => tracking.log_medication(&MedicationItem {
            name,
            dosage,
            frequency,
            icon: DEFAULT_MEDICATION_ICON.to_string(),
            color: String::new(),
            is_taken: !not_taken,
        })?,
        LogCommand::Symptom {
            name,
            severity,
            notes,
            time,
        } => Some(tracking.log_symptom(&SymptomLog {
            name,
            severity,
            notes,
            timestamp: parse_time(time.as_deref())?,
        })?),
        LogCommand::Sleep {
            hours,
            quality,
            notes,
            time,
        } => Some(tracking.log_sleep(&SleepLog {
            hours,
            quality,
            notes,
            date: parse_time(time.as_deref())?,
        })?),
        LogCommand::Therapy {
            kind,
            minutes,
            notes,
            time,
        } => Some(tracking.log_therapy(&TherapySession {
            kind,
            duration_minutes: minutes,
            notes,
            date: parse_time(time.as_deref())?,
        })?),
    };
    Ok(entry)
}

fn parse_time(raw: Option<&str>) -> Result<DateTime<Utc>, String> {
    match raw.map(str::trim) {
        None | Some("now") => Ok(Utc::now()),
        Some("yesterday") => Ok(Utc::now() - Duration::days(1)),
        Some(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                Ok(dt.with_timezone(&Utc))
            } else if let Some(dt) = s
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
            {
                Ok(dt)
            } else {
                Err(format!("invalid time `{s}`"))
            }
        }
    }
}

fn print_profile(profile: &UserProfile, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    let name = if profile.name().is_empty() {
        "(unnamed)"
    } else {
        profile.name()
    };
    println!("Name: {name}");
    println!(
        "Flare pattern: {}",
        profile.flare_pattern().map_or("(unset)", |pattern| pattern.label())
    );
    println!("Onboarding completed: {}", profile.onboarding_completed());
    for set in SelectionSet::ALL {
        let values = profile.selections(set);
        if values.is_empty() {
            continue;
        }
        println!("{set}:");
        for value in values {
            match (set, profile.severity_of(value)) {
                (SelectionSet::Symptoms, Some(severity)) => {
                    println!("  - {value} ({severity}/10)")
                }
                _ => println!("  - {value}"),
            }
        }
    }
    Ok(())
}

fn print_entries<'a>(
    entries: impl IntoIterator<Item = &'a TimelineEntry>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let entries: Vec<&TimelineEntry> = entries.into_iter().collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No entries.");
    }
    for entry in entries {
        println!(
            "{} {} [{}] {} - {}",
            entry.timestamp().with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.icon(),
            entry.category(),
            entry.title(),
            entry.subtitle()
        );
    }
    Ok(())
}

fn print_activities(activities: &[&LoggedActivity], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(activities)?);
        return Ok(());
    }
    if activities.is_empty() {
        println!("No activities.");
    }
    for activity in activities {
        let entry = activity
            .entry_id
            .map_or_else(|| "(no entry)".to_string(), |id| id.to_string());
        print!(
            "{} [{}] {entry}",
            activity.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            activity.record.kind()
        );
        match activity.record.notes() {
            "" => println!(),
            notes => println!(" - {notes}"),
        }
    }
    Ok(())
}

fn print_catalog(name: Option<&str>, json: bool) -> Result<(), Box<dyn Error>> {
    let mut lists: Vec<(&str, &[&str])> = Vec::new();
    match name.map(str::trim) {
        None => {
            for set in SelectionSet::ALL {
                lists.push((set.as_str(), catalog_for(set)));
            }
            lists.push(("treatments", TREATMENTS));
            lists.push(("meals", MEAL_TYPES));
        }
        Some("treatments") => lists.push(("treatments", TREATMENTS)),
        Some("meals") => lists.push(("meals", MEAL_TYPES)),
        Some(other) => {
            let set = other.parse::<SelectionSet>()?;
            lists.push((set.as_str(), catalog_for(set)));
        }
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = lists
            .into_iter()
            .map(|(name, values)| (name.to_string(), serde_json::json!(values)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }
    for (name, values) in lists {
        println!("{name}:");
        for value in values {
            println!("  - {value}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_time_accepts_rfc3339_and_millis() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 10, 8, 30, 0).unwrap();
        assert_eq!(parse_time(Some("2025-09-10T08:30:00Z")).unwrap(), expected);
        assert_eq!(
            parse_time(Some(&expected.timestamp_millis().to_string())).unwrap(),
            expected
        );
        assert!(parse_time(Some("last tuesday")).is_err());
    }

    #[test]
    fn cli_parses_nested_log_command() {
        let cli = Cli::try_parse_from([
            "symtrack", "--json", "log", "symptom", "Fatigue", "7", "--time", "now",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Log {
                activity: LogCommand::Symptom { severity: 7, .. }
            }
        ));
    }

    #[test]
    fn cli_parses_activities_limit() {
        let cli = Cli::try_parse_from(["symtrack", "activities", "--limit", "5"]).unwrap();
        match cli.command {
            Commands::Activities { limit } => assert_eq!(limit, 5),
            _ => panic!("expected activities command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_selection_set() {
        assert!(Cli::try_parse_from(["symtrack", "toggle", "moods", "Happy"]).is_err());
    }
}
