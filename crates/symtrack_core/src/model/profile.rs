//! User profile domain model.
//!
//! # Responsibility
//! - Hold onboarding answers and tracking preferences.
//! - Enforce the severity-to-symptom referential invariant in one place.
//!
//! # Invariants
//! - Every key of `symptom_severity` is a member of `symptoms`.
//! - Removing a symptom removes its severity entry.
//! - `Severity` values are always within `1..=10`.

use crate::model::validation::{clamp_severity, SEVERITY_MAX, SEVERITY_MIN};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named string sets held by the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSet {
    Conditions,
    Symptoms,
    Triggers,
    Routines,
    Goals,
}

impl SelectionSet {
    pub const ALL: [SelectionSet; 5] = [
        Self::Conditions,
        Self::Symptoms,
        Self::Triggers,
        Self::Routines,
        Self::Goals,
    ];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conditions => "conditions",
            Self::Symptoms => "symptoms",
            Self::Triggers => "triggers",
            Self::Routines => "routines",
            Self::Goals => "goals",
        }
    }
}

impl Display for SelectionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionSet {
    type Err = ProfileParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "conditions" | "condition" => Ok(Self::Conditions),
            "symptoms" | "symptom" => Ok(Self::Symptoms),
            "triggers" | "trigger" => Ok(Self::Triggers),
            "routines" | "routine" => Ok(Self::Routines),
            "goals" | "goal" => Ok(Self::Goals),
            other => Err(ProfileParseError::UnknownSelectionSet(other.to_string())),
        }
    }
}

/// How a user's symptoms vary over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlarePattern {
    /// Symptoms flare up periodically.
    Episodic,
    /// Symptoms are always present.
    Constant,
    /// Symptoms change unpredictably.
    Variable,
}

impl FlarePattern {
    pub const ALL: [FlarePattern; 3] = [Self::Episodic, Self::Constant, Self::Variable];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Episodic => "episodic",
            Self::Constant => "constant",
            Self::Variable => "variable",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Episodic => "Episodic",
            Self::Constant => "Constant",
            Self::Variable => "Variable",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Episodic => "Symptoms flare up periodically",
            Self::Constant => "Symptoms are always present",
            Self::Variable => "Symptoms change unpredictably",
        }
    }
}

impl FromStr for FlarePattern {
    type Err = ProfileParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "episodic" => Ok(Self::Episodic),
            "constant" => Ok(Self::Constant),
            "variable" => Ok(Self::Variable),
            other => Err(ProfileParseError::UnknownFlarePattern(other.to_string())),
        }
    }
}

/// Scalar profile fields replaced wholesale by `set_scalar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    FlarePattern,
}

impl FromStr for ProfileField {
    type Err = ProfileParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "flare_pattern" | "flarepattern" | "flare" => Ok(Self::FlarePattern),
            other => Err(ProfileParseError::UnknownField(other.to_string())),
        }
    }
}

/// Self-reported symptom intensity, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    /// Builds a severity by clamping any raw reading into range.
    pub fn clamped(level: i64) -> Self {
        Self(clamp_severity(level))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = ProfileValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (SEVERITY_MIN..=SEVERITY_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProfileValidationError::SeverityOutOfRange(value))
        }
    }
}

impl From<Severity> for u8 {
    fn from(value: Severity) -> Self {
        value.0
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors for parsing profile vocabulary from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileParseError {
    UnknownSelectionSet(String),
    UnknownFlarePattern(String),
    UnknownField(String),
}

impl Display for ProfileParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSelectionSet(value) => write!(
                f,
                "unknown selection set `{value}`; expected conditions|symptoms|triggers|routines|goals"
            ),
            Self::UnknownFlarePattern(value) => write!(
                f,
                "unknown flare pattern `{value}`; expected episodic|constant|variable"
            ),
            Self::UnknownField(value) => {
                write!(f, "unknown profile field `{value}`; expected name|flare_pattern")
            }
        }
    }
}

impl Error for ProfileParseError {}

/// Profile invariant violations found on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    SeverityOutOfRange(u8),
    OrphanSeverity(String),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeverityOutOfRange(value) => write!(
                f,
                "severity {value} is outside {SEVERITY_MIN}..={SEVERITY_MAX}"
            ),
            Self::OrphanSeverity(symptom) => {
                write!(f, "severity recorded for unselected symptom `{symptom}`")
            }
        }
    }
}

impl Error for ProfileValidationError {}

/// Onboarding answers and tracking preferences for the single local user.
///
/// Fields are private: all writes go through methods so the severity
/// invariant cannot be bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUserProfile")]
pub struct UserProfile {
    name: String,
    conditions: BTreeSet<String>,
    symptoms: BTreeSet<String>,
    symptom_severity: BTreeMap<String, Severity>,
    flare_pattern: Option<FlarePattern>,
    triggers: BTreeSet<String>,
    routines: BTreeSet<String>,
    goals: BTreeSet<String>,
    onboarding_completed: bool,
}

#[derive(Deserialize)]
struct RawUserProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    conditions: BTreeSet<String>,
    #[serde(default)]
    symptoms: BTreeSet<String>,
    #[serde(default)]
    symptom_severity: BTreeMap<String, Severity>,
    #[serde(default)]
    flare_pattern: Option<FlarePattern>,
    #[serde(default)]
    triggers: BTreeSet<String>,
    #[serde(default)]
    routines: BTreeSet<String>,
    #[serde(default)]
    goals: BTreeSet<String>,
    #[serde(default)]
    onboarding_completed: bool,
}

impl TryFrom<RawUserProfile> for UserProfile {
    type Error = ProfileValidationError;

    fn try_from(raw: RawUserProfile) -> Result<Self, Self::Error> {
        let profile = Self {
            name: raw.name,
            conditions: raw.conditions,
            symptoms: raw.symptoms,
            symptom_severity: raw.symptom_severity,
            flare_pattern: raw.flare_pattern,
            triggers: raw.triggers,
            routines: raw.routines,
            goals: raw.goals,
            onboarding_completed: raw.onboarding_completed,
        };
        profile.validate()?;
        Ok(profile)
    }
}

impl UserProfile {
    /// Empty profile used at onboarding start and on first launch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flare_pattern(&self) -> Option<FlarePattern> {
        self.flare_pattern
    }

    pub fn onboarding_completed(&self) -> bool {
        self.onboarding_completed
    }

    pub fn conditions(&self) -> &BTreeSet<String> {
        &self.conditions
    }

    pub fn symptoms(&self) -> &BTreeSet<String> {
        &self.symptoms
    }

    pub fn triggers(&self) -> &BTreeSet<String> {
        &self.triggers
    }

    pub fn routines(&self) -> &BTreeSet<String> {
        &self.routines
    }

    pub fn goals(&self) -> &BTreeSet<String> {
        &self.goals
    }

    pub fn symptom_severity(&self) -> &BTreeMap<String, Severity> {
        &self.symptom_severity
    }

    pub fn severity_of(&self, symptom: &str) -> Option<Severity> {
        self.symptom_severity.get(symptom).copied()
    }

    /// Returns the named set.
    pub fn selections(&self, set: SelectionSet) -> &BTreeSet<String> {
        match set {
            SelectionSet::Conditions => &self.conditions,
            SelectionSet::Symptoms => &self.symptoms,
            SelectionSet::Triggers => &self.triggers,
            SelectionSet::Routines => &self.routines,
            SelectionSet::Goals => &self.goals,
        }
    }

    pub fn contains(&self, set: SelectionSet, value: &str) -> bool {
        self.selections(set).contains(value)
    }

    fn selections_mut(&mut self, set: SelectionSet) -> &mut BTreeSet<String> {
        match set {
            SelectionSet::Conditions => &mut self.conditions,
            SelectionSet::Symptoms => &mut self.symptoms,
            SelectionSet::Triggers => &mut self.triggers,
            SelectionSet::Routines => &mut self.routines,
            SelectionSet::Goals => &mut self.goals,
        }
    }

    /// Flips membership of `value` and returns the new membership.
    pub fn toggle(&mut self, set: SelectionSet, value: &str) -> bool {
        if self.contains(set, value) {
            self.remove(set, value);
            false
        } else {
            self.insert(set, value);
            true
        }
    }

    /// Inserts `value`; returns `true` when it was not present.
    pub fn insert(&mut self, set: SelectionSet, value: &str) -> bool {
        self.selections_mut(set).insert(value.to_string())
    }

    /// Removes `value`; returns `true` when it was present.
    ///
    /// Removing a symptom also drops its severity.
    pub fn remove(&mut self, set: SelectionSet, value: &str) -> bool {
        let removed = self.selections_mut(set).remove(value);
        if set == SelectionSet::Symptoms {
            self.symptom_severity.remove(value);
        }
        removed
    }

    /// Records severity for a selected symptom.
    ///
    /// Returns `false` and changes nothing when `symptom` is not selected.
    pub fn set_severity(&mut self, symptom: &str, severity: Severity) -> bool {
        if !self.symptoms.contains(symptom) {
            return false;
        }
        self.symptom_severity.insert(symptom.to_string(), severity);
        true
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_flare_pattern(&mut self, pattern: Option<FlarePattern>) {
        self.flare_pattern = pattern;
    }

    pub fn set_onboarding_completed(&mut self, completed: bool) {
        self.onboarding_completed = completed;
    }

    /// Checks the severity-to-symptom invariant.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        match self
            .symptom_severity
            .keys()
            .find(|symptom| !self.symptoms.contains(*symptom))
        {
            Some(orphan) => Err(ProfileValidationError::OrphanSeverity(orphan.clone())),
            None => Ok(()),
        }
    }
}
