//! Fixed option lists offered during onboarding and tracking.

use crate::model::profile::SelectionSet;

pub const CONDITIONS: &[&str] = &[
    "Rheumatoid Arthritis",
    "Lupus",
    "Fibromyalgia",
    "Chronic Fatigue Syndrome",
    "Multiple Sclerosis",
    "Crohn's Disease",
    "IBS",
    "Endometriosis",
    "Psoriasis",
    "Eczema",
    "Migraine",
    "Anxiety",
    "Depression",
];

pub const SYMPTOMS: &[&str] = &[
    "Joint Pain",
    "Fatigue",
    "Stiffness",
    "Swelling",
    "Brain Fog",
    "Sleep Issues",
    "Headaches",
    "Nausea",
    "Digestive Issues",
    "Mood Changes",
    "Skin Issues",
    "Muscle Pain",
    "Memory Problems",
];

pub const TRIGGERS: &[&str] = &[
    "Stress",
    "Weather Changes",
    "Lack of Sleep",
    "Certain Foods",
    "Overexertion",
    "Hormonal Changes",
    "Infections",
    "Medication Changes",
];

pub const ROUTINES: &[&str] = &[
    "Morning Stretching",
    "Meditation",
    "Regular Exercise",
    "Healthy Eating",
    "Consistent Sleep Schedule",
    "Hydration",
    "Stress Management",
    "Gentle Movement",
];

pub const GOALS: &[&str] = &[
    "Reduce Pain",
    "Improve Sleep",
    "Increase Energy",
    "Better Mood",
    "Manage Stress",
    "Maintain Mobility",
    "Track Patterns",
    "Build Habits",
];

pub const TREATMENTS: &[&str] = &[
    "Medications",
    "Supplements",
    "Diet Restrictions",
    "Physical Therapy",
    "Mental Health Therapy",
    "Alternative Medicine",
];

pub const MEAL_TYPES: &[&str] = &["Breakfast", "Lunch", "Dinner", "Snacks"];

/// Catalog offered for one selection set. Custom values are allowed on top.
pub fn catalog_for(set: SelectionSet) -> &'static [&'static str] {
    match set {
        SelectionSet::Conditions => CONDITIONS,
        SelectionSet::Symptoms => SYMPTOMS,
        SelectionSet::Triggers => TRIGGERS,
        SelectionSet::Routines => ROUTINES,
        SelectionSet::Goals => GOALS,
    }
}

/// Whether `value` is a built-in option rather than a user-added one.
pub fn is_catalog_value(set: SelectionSet, value: &str) -> bool {
    catalog_for(set).contains(&value)
}
