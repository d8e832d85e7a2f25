//! Profile store contracts and implementations.
//!
//! # Responsibility
//! - Save and load the single local `UserProfile`.
//! - Report "no prior state" distinctly from failures.
//!
//! # Invariants
//! - `save` replaces the whole persisted profile atomically.
//! - `load` returns `Ok(None)` when nothing was ever saved.

use crate::model::profile::{FlarePattern, SelectionSet, Severity, UserProfile};
use crate::repo::{PersistError, PersistResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;

/// Durable storage for the user profile.
pub trait ProfileStore {
    fn save(&self, profile: &UserProfile) -> PersistResult<()>;
    fn load(&self) -> PersistResult<Option<UserProfile>>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for &T {
    fn save(&self, profile: &UserProfile) -> PersistResult<()> {
        (**self).save(profile)
    }

    fn load(&self) -> PersistResult<Option<UserProfile>> {
        (**self).load()
    }
}

/// SQLite-backed profile store over a migrated connection.
pub struct SqliteProfileStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileStore for SqliteProfileStore<'_> {
    fn save(&self, profile: &UserProfile) -> PersistResult<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(PersistError::write)?;

        tx.execute(
            "INSERT INTO profile (id, name, flare_pattern, onboarding_completed, updated_at)
             VALUES (1, ?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                flare_pattern = excluded.flare_pattern,
                onboarding_completed = excluded.onboarding_completed,
                updated_at = excluded.updated_at;",
            params![
                profile.name(),
                profile.flare_pattern().map(FlarePattern::as_str),
                bool_to_int(profile.onboarding_completed()),
            ],
        )
        .map_err(PersistError::write)?;

        tx.execute("DELETE FROM profile_selections;", [])
            .map_err(PersistError::write)?;
        tx.execute("DELETE FROM symptom_severity;", [])
            .map_err(PersistError::write)?;

        {
            let mut insert_selection = tx
                .prepare_cached(
                    "INSERT INTO profile_selections (selection_set, value) VALUES (?1, ?2);",
                )
                .map_err(PersistError::write)?;
            for set in SelectionSet::ALL {
                for value in profile.selections(set) {
                    insert_selection
                        .execute(params![set.as_str(), value])
                        .map_err(PersistError::write)?;
                }
            }

            let mut insert_severity = tx
                .prepare_cached("INSERT INTO symptom_severity (symptom, level) VALUES (?1, ?2);")
                .map_err(PersistError::write)?;
            for (symptom, severity) in profile.symptom_severity() {
                insert_severity
                    .execute(params![symptom, i64::from(severity.value())])
                    .map_err(PersistError::write)?;
            }
        }

        tx.commit().map_err(PersistError::write)
    }

    fn load(&self) -> PersistResult<Option<UserProfile>> {
        let header = self
            .conn
            .query_row(
                "SELECT name, flare_pattern, onboarding_completed FROM profile WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(PersistError::unavailable)?;

        let Some((name, flare_text, completed)) = header else {
            return Ok(None);
        };

        let mut profile = UserProfile::new();
        profile.set_name(name);
        profile.set_flare_pattern(match flare_text {
            Some(text) => Some(
                text.parse::<FlarePattern>()
                    .map_err(|err| PersistError::Decode(err.to_string()))?,
            ),
            None => None,
        });
        profile.set_onboarding_completed(match completed {
            0 => false,
            1 => true,
            other => {
                return Err(PersistError::Decode(format!(
                    "invalid onboarding_completed value `{other}` in profile"
                )));
            }
        });

        let mut stmt = self
            .conn
            .prepare("SELECT selection_set, value FROM profile_selections ORDER BY selection_set, value;")
            .map_err(PersistError::unavailable)?;
        let mut rows = stmt.query([]).map_err(PersistError::unavailable)?;
        while let Some(row) = rows.next().map_err(PersistError::unavailable)? {
            let set_text: String = row.get(0).map_err(PersistError::unavailable)?;
            let value: String = row.get(1).map_err(PersistError::unavailable)?;
            let set = set_text
                .parse::<SelectionSet>()
                .map_err(|err| PersistError::Decode(err.to_string()))?;
            profile.insert(set, &value);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT symptom, level FROM symptom_severity ORDER BY symptom;")
            .map_err(PersistError::unavailable)?;
        let mut rows = stmt.query([]).map_err(PersistError::unavailable)?;
        while let Some(row) = rows.next().map_err(PersistError::unavailable)? {
            let symptom: String = row.get(0).map_err(PersistError::unavailable)?;
            let level: i64 = row.get(1).map_err(PersistError::unavailable)?;
            let severity = u8::try_from(level)
                .ok()
                .and_then(|value| Severity::try_from(value).ok())
                .ok_or_else(|| {
                    PersistError::Decode(format!(
                        "invalid severity `{level}` for symptom `{symptom}`"
                    ))
                })?;
            if !profile.set_severity(&symptom, severity) {
                return Err(PersistError::Decode(format!(
                    "severity recorded for unselected symptom `{symptom}`"
                )));
            }
        }

        Ok(Some(profile))
    }
}

/// In-process profile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    saved: RefCell<Option<UserProfile>>,
    save_count: RefCell<usize>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the store as if `profile` had been saved earlier.
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            saved: RefCell::new(Some(profile)),
            save_count: RefCell::new(0),
        }
    }

    /// Most recently saved profile.
    pub fn snapshot(&self) -> Option<UserProfile> {
        self.saved.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.borrow()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn save(&self, profile: &UserProfile) -> PersistResult<()> {
        *self.saved.borrow_mut() = Some(profile.clone());
        *self.save_count.borrow_mut() += 1;
        Ok(())
    }

    fn load(&self) -> PersistResult<Option<UserProfile>> {
        Ok(self.saved.borrow().clone())
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
