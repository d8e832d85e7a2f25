//! Selection state use-cases.
//!
//! # Responsibility
//! - Own the in-memory `UserProfile` and the onboarding step cursor.
//! - Route every mutation through one place so profile invariants hold.
//! - Flush to the injected `ProfileStore` and notify observers after each
//!   mutation.
//!
//! # Invariants
//! - Persistence failures are logged, never returned from mutations, and
//!   kept for `last_save_error`.
//! - Mutations are total: given well-typed input they never fail.
//! - Log lines carry metadata only (set names, counts), never user text.

use crate::model::profile::{
    FlarePattern, ProfileField, SelectionSet, Severity, UserProfile,
};
use crate::model::validation::{validate_name, ValidationError};
use crate::repo::profile_store::ProfileStore;
use log::{debug, error, info, warn};

/// Fixed sequence of onboarding screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OnboardingStep {
    Welcome,
    Profile,
    Conditions,
    Symptoms,
    FlarePattern,
    Treatments,
    Triggers,
    Goals,
    Summary,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 9] = [
        Self::Welcome,
        Self::Profile,
        Self::Conditions,
        Self::Symptoms,
        Self::FlarePattern,
        Self::Treatments,
        Self::Triggers,
        Self::Goals,
        Self::Summary,
    ];

    /// Zero-based position in the flow.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|index| Self::ALL[index])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Profile => "profile",
            Self::Conditions => "conditions",
            Self::Symptoms => "symptoms",
            Self::FlarePattern => "flare_pattern",
            Self::Treatments => "treatments",
            Self::Triggers => "triggers",
            Self::Goals => "goals",
            Self::Summary => "summary",
        }
    }
}

/// Change notification delivered to observers after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Selection {
        set: SelectionSet,
        value: String,
        selected: bool,
    },
    Severity {
        symptom: String,
        severity: Severity,
    },
    Name,
    FlarePattern(Option<FlarePattern>),
    Step(OnboardingStep),
    OnboardingCompleted,
    OnboardingReset,
}

/// Receives profile changes, e.g. to invalidate a rendered view.
pub trait StateObserver {
    fn on_change(&self, profile: &UserProfile, change: &StateChange);
}

impl<F> StateObserver for F
where
    F: Fn(&UserProfile, &StateChange),
{
    fn on_change(&self, profile: &UserProfile, change: &StateChange) {
        self(profile, change)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Single source of truth for onboarding answers and tracking preferences.
pub struct SelectionState<S: ProfileStore> {
    profile: UserProfile,
    store: S,
    step: OnboardingStep,
    observers: Vec<(ObserverId, Box<dyn StateObserver>)>,
    next_observer_id: u64,
    last_save_error: Option<String>,
}

impl<S: ProfileStore> SelectionState<S> {
    /// Loads the saved profile, falling back to an empty one.
    ///
    /// Called once at startup. A failed load is logged and treated like a
    /// first launch.
    pub fn load(store: S) -> Self {
        let profile = match store.load() {
            Ok(Some(profile)) => {
                info!(
                    "event=profile_load module=selection status=ok onboarding_completed={}",
                    profile.onboarding_completed()
                );
                profile
            }
            Ok(None) => {
                info!("event=profile_load module=selection status=empty");
                UserProfile::new()
            }
            Err(err) => {
                error!(
                    "event=profile_load module=selection status=error error_code={} error={}",
                    err.code(),
                    err
                );
                UserProfile::new()
            }
        };
        Self::with_profile(store, profile)
    }

    /// Wraps an already materialized profile without touching the store.
    pub fn with_profile(store: S, profile: UserProfile) -> Self {
        Self {
            profile,
            store,
            step: OnboardingStep::Welcome,
            observers: Vec::new(),
            next_observer_id: 0,
            last_save_error: None,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_step(&self) -> OnboardingStep {
        self.step
    }

    /// Whether the onboarding flow should be presented.
    pub fn show_onboarding(&self) -> bool {
        !self.profile.onboarding_completed()
    }

    /// Flips membership of `value` in `set` and returns the new membership.
    ///
    /// Deselecting a symptom also drops its severity. A blank value is a
    /// no-op.
    pub fn toggle(&mut self, set: SelectionSet, value: &str) -> bool {
        if value.trim().is_empty() {
            warn!(
                "event=selection_toggle module=selection status=skipped set={} reason=blank_value",
                set
            );
            return false;
        }

        let selected = self.profile.toggle(set, value);
        debug!(
            "event=selection_toggle module=selection status=ok set={} selected={} set_size={}",
            set,
            selected,
            self.profile.selections(set).len()
        );
        self.commit(StateChange::Selection {
            set,
            value: value.to_string(),
            selected,
        });
        selected
    }

    /// Adds a user-entered option ("Add Custom") after validating it.
    ///
    /// Inserts rather than toggles: re-adding an existing value keeps it
    /// selected. Returns the normalized value.
    pub fn add_custom(&mut self, set: SelectionSet, value: &str) -> Result<String, ValidationError> {
        let normalized = validate_name(set.as_str(), value)?;
        self.profile.insert(set, &normalized);
        self.commit(StateChange::Selection {
            set,
            value: normalized.clone(),
            selected: true,
        });
        Ok(normalized)
    }

    /// Records a clamped severity for a selected symptom.
    ///
    /// Returns `None` and changes nothing when the symptom is not selected;
    /// use `select_with_severity` for the combined action.
    pub fn set_severity(&mut self, symptom: &str, level: i64) -> Option<Severity> {
        let severity = Severity::clamped(level);
        if !self.profile.set_severity(symptom, severity) {
            warn!(
                "event=severity_set module=selection status=skipped reason=symptom_not_selected"
            );
            return None;
        }
        self.commit(StateChange::Severity {
            symptom: symptom.to_string(),
            severity,
        });
        Some(severity)
    }

    /// Selects `symptom` if needed and records its severity in one step.
    ///
    /// A blank symptom is a no-op returning `None`.
    pub fn select_with_severity(&mut self, symptom: &str, level: i64) -> Option<Severity> {
        if symptom.trim().is_empty() {
            warn!("event=severity_set module=selection status=skipped reason=blank_value");
            return None;
        }
        let severity = Severity::clamped(level);
        if self.profile.insert(SelectionSet::Symptoms, symptom) {
            self.notify(&StateChange::Selection {
                set: SelectionSet::Symptoms,
                value: symptom.to_string(),
                selected: true,
            });
        }
        self.profile.set_severity(symptom, severity);
        self.commit(StateChange::Severity {
            symptom: symptom.to_string(),
            severity,
        });
        Some(severity)
    }

    /// Replaces a scalar field from its textual form.
    ///
    /// An unrecognized or blank flare pattern clears the pattern.
    pub fn set_scalar(&mut self, field: ProfileField, value: &str) {
        match field {
            ProfileField::Name => self.set_name(value),
            ProfileField::FlarePattern => {
                let pattern = if value.trim().is_empty() {
                    None
                } else {
                    match value.parse::<FlarePattern>() {
                        Ok(pattern) => Some(pattern),
                        Err(err) => {
                            warn!(
                                "event=flare_pattern_set module=selection status=cleared error={}",
                                err
                            );
                            None
                        }
                    }
                };
                self.set_flare_pattern(pattern);
            }
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.profile.set_name(name);
        self.commit(StateChange::Name);
    }

    pub fn set_flare_pattern(&mut self, pattern: Option<FlarePattern>) {
        self.profile.set_flare_pattern(pattern);
        self.commit(StateChange::FlarePattern(pattern));
    }

    /// Moves to the next onboarding step; from `Summary` this completes
    /// onboarding instead.
    pub fn advance(&mut self) -> OnboardingStep {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.notify(&StateChange::Step(next));
            }
            None => self.complete_onboarding(),
        }
        self.step
    }

    /// Moves to the previous onboarding step, staying on `Welcome`.
    pub fn back(&mut self) -> OnboardingStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.notify(&StateChange::Step(previous));
        }
        self.step
    }

    pub fn complete_onboarding(&mut self) {
        info!("event=onboarding_complete module=selection status=ok");
        self.profile.set_onboarding_completed(true);
        self.commit(StateChange::OnboardingCompleted);
    }

    /// Clears all answers and restarts onboarding from the first step.
    pub fn reset_onboarding(&mut self) {
        info!("event=onboarding_reset module=selection status=ok");
        self.profile = UserProfile::new();
        self.step = OnboardingStep::Welcome;
        self.commit(StateChange::OnboardingReset);
    }

    /// Registers an observer invoked after every mutation.
    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `true` when the observer was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Saves the current profile. Failures are logged and kept for
    /// `last_save_error`; the in-memory profile stays authoritative.
    pub fn flush(&mut self) {
        self.last_save_error = match self.store.save(&self.profile) {
            Ok(()) => None,
            Err(err) => {
                error!(
                    "event=profile_save module=selection status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Some(format!("{}: {err}", err.code()))
            }
        };
    }

    /// Error of the most recent save, `None` when it succeeded or no save
    /// has run yet.
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    fn commit(&mut self, change: StateChange) {
        self.flush();
        self.notify(&change);
    }

    fn notify(&self, change: &StateChange) {
        for (_, observer) in &self.observers {
            observer.on_change(&self.profile, change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::profile_store::MemoryProfileStore;
    use crate::repo::{PersistError, PersistResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FailingStore;

    impl ProfileStore for FailingStore {
        fn save(&self, _profile: &UserProfile) -> PersistResult<()> {
            Err(PersistError::Decode("disk full".to_string()))
        }

        fn load(&self) -> PersistResult<Option<UserProfile>> {
            Err(PersistError::Decode("corrupt".to_string()))
        }
    }

    #[test]
    fn first_launch_yields_empty_profile() {
        let state = SelectionState::load(MemoryProfileStore::new());
        assert_eq!(state.profile(), &UserProfile::new());
        assert_eq!(state.profile().name(), "");
        assert!(state.show_onboarding());
    }

    #[test]
    fn toggle_twice_restores_empty_set_and_flushes_each_time() {
        let store = MemoryProfileStore::new();
        let mut state = SelectionState::load(&store);

        assert!(state.toggle(SelectionSet::Conditions, "Migraine"));
        assert_eq!(
            store.snapshot().unwrap().conditions().iter().collect::<Vec<_>>(),
            vec!["Migraine"]
        );

        assert!(!state.toggle(SelectionSet::Conditions, "Migraine"));
        assert!(state.profile().conditions().is_empty());
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn blank_toggle_is_a_no_op() {
        let store = MemoryProfileStore::new();
        let mut state = SelectionState::load(&store);
        assert!(!state.toggle(SelectionSet::Goals, "   "));
        assert!(state.profile().goals().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn set_severity_leaves_membership_untouched() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        assert_eq!(state.set_severity("Fatigue", 7), None);
        assert!(state.profile().symptoms().is_empty());

        state.toggle(SelectionSet::Symptoms, "Fatigue");
        assert_eq!(state.set_severity("Fatigue", 0).map(Severity::value), Some(1));
        assert_eq!(state.set_severity("Fatigue", 12).map(Severity::value), Some(10));
        assert_eq!(state.profile().symptoms().len(), 1);
    }

    #[test]
    fn select_with_severity_combines_both_steps() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        let severity = state.select_with_severity("Brain Fog", 6);
        assert_eq!(severity.map(Severity::value), Some(6));
        assert!(state.profile().contains(SelectionSet::Symptoms, "Brain Fog"));

        state.toggle(SelectionSet::Symptoms, "Brain Fog");
        assert_eq!(state.profile().severity_of("Brain Fog"), None);
    }

    #[test]
    fn select_with_severity_ignores_blank_symptom() {
        let store = MemoryProfileStore::new();
        let mut state = SelectionState::load(&store);

        assert_eq!(state.select_with_severity("   ", 5), None);
        assert!(state.profile().symptoms().is_empty());
        assert!(state.profile().symptom_severity().is_empty());
        assert_eq!(store.save_count(), 0);

        assert!(!state.toggle(SelectionSet::Symptoms, "   "));
        assert!(state.profile().symptoms().is_empty());
    }

    #[test]
    fn set_scalar_replaces_name_and_parses_flare_pattern() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        state.set_scalar(ProfileField::Name, "Sam");
        state.set_scalar(ProfileField::FlarePattern, "Variable");
        assert_eq!(state.profile().name(), "Sam");
        assert_eq!(state.profile().flare_pattern(), Some(FlarePattern::Variable));

        state.set_scalar(ProfileField::FlarePattern, "Weekly");
        assert_eq!(state.profile().flare_pattern(), None);

        state.set_scalar(ProfileField::Name, "");
        assert_eq!(state.profile().name(), "");
    }

    #[test]
    fn add_custom_rejects_blank_and_inserts_normalized_value() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        assert!(state.add_custom(SelectionSet::Triggers, " ").is_err());

        let value = state.add_custom(SelectionSet::Triggers, "  Loud noise ").unwrap();
        assert_eq!(value, "Loud noise");
        state.add_custom(SelectionSet::Triggers, "Loud noise").unwrap();
        assert!(state.profile().contains(SelectionSet::Triggers, "Loud noise"));
    }

    #[test]
    fn advancing_past_summary_completes_onboarding() {
        let store = MemoryProfileStore::new();
        let mut state = SelectionState::load(&store);
        assert_eq!(state.back(), OnboardingStep::Welcome);

        for _ in 0..8 {
            state.advance();
        }
        assert_eq!(state.current_step(), OnboardingStep::Summary);
        assert!(state.show_onboarding());

        state.advance();
        assert!(!state.show_onboarding());
        assert!(store.snapshot().unwrap().onboarding_completed());
    }

    #[test]
    fn reset_onboarding_clears_answers() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        state.set_name("Sam");
        state.select_with_severity("Fatigue", 4);
        state.advance();
        state.complete_onboarding();

        state.reset_onboarding();
        assert_eq!(state.profile(), &UserProfile::new());
        assert_eq!(state.current_step(), OnboardingStep::Welcome);
    }

    #[test]
    fn persistence_failures_are_swallowed() {
        let mut state = SelectionState::load(FailingStore);
        assert_eq!(state.profile(), &UserProfile::new());
        assert_eq!(state.last_save_error(), None);

        assert!(state.toggle(SelectionSet::Routines, "Meditation"));
        assert!(state.profile().contains(SelectionSet::Routines, "Meditation"));
        let error = state.last_save_error().unwrap();
        assert!(error.starts_with("decode_failed"), "{error}");
        assert!(error.contains("disk full"), "{error}");
    }

    #[test]
    fn successful_save_clears_last_save_error() {
        let mut state = SelectionState::load(MemoryProfileStore::new());
        state.set_name("Sam");
        assert_eq!(state.last_save_error(), None);
    }

    #[test]
    fn observers_see_changes_until_unsubscribed() {
        let seen: Rc<RefCell<Vec<StateChange>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut state = SelectionState::load(MemoryProfileStore::new());
        let id = state.subscribe(move |_: &UserProfile, change: &StateChange| {
            sink.borrow_mut().push(change.clone());
        });

        state.toggle(SelectionSet::Goals, "Improve Sleep");
        state.advance();
        assert_eq!(
            *seen.borrow(),
            vec![
                StateChange::Selection {
                    set: SelectionSet::Goals,
                    value: "Improve Sleep".to_string(),
                    selected: true,
                },
                StateChange::Step(OnboardingStep::Profile),
            ]
        );

        assert!(state.unsubscribe(id));
        state.toggle(SelectionSet::Goals, "Improve Sleep");
        assert_eq!(seen.borrow().len(), 2);
    }
}
