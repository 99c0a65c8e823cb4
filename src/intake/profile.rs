//! Profile fields and the captured profile map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A profile field the questionnaire asks about.
///
/// Declaration order is intake order; `Profile` iterates in this order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    Gender,
    Weight,
    Height,
    Activity,
    Goal,
    DietaryPreference,
}

impl ProfileField {
    pub const ALL: [ProfileField; 7] = [
        Self::Age,
        Self::Gender,
        Self::Weight,
        Self::Height,
        Self::Activity,
        Self::Goal,
        Self::DietaryPreference,
    ];

    /// Internal key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Activity => "activity",
            Self::Goal => "goal",
            Self::DietaryPreference => "dietary_preference",
        }
    }

    /// Label shown in the review summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Età",
            Self::Gender => "Sesso",
            Self::Weight => "Peso (kg)",
            Self::Height => "Altezza (cm)",
            Self::Activity => "Livello di attività",
            Self::Goal => "Obiettivo",
            Self::DietaryPreference => "Preferenze alimentari",
        }
    }

    /// Short Italian name used in `modifica <campo>`.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::Age => "eta",
            Self::Gender => "sesso",
            Self::Weight => "peso",
            Self::Height => "altezza",
            Self::Activity => "attivita",
            Self::Goal => "obiettivo",
            Self::DietaryPreference => "dieta",
        }
    }

    /// Whether an empty answer is a valid capture for this field.
    pub fn allows_empty(&self) -> bool {
        matches!(self, Self::DietaryPreference)
    }

    /// Whether the field is posted as a whole number.
    pub fn is_whole_number(&self) -> bool {
        matches!(self, Self::Age | Self::Height)
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for ProfileField {
    type Err = InputError;

    /// Accepts the internal key or the Italian alias, with or without accents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('à', "a").replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.key() == normalized || f.alias() == normalized)
            .ok_or_else(|| InputError::UnknownField(s.trim().to_string()))
    }
}

/// Captured answers, keyed by field.
///
/// Values are kept raw: numeric and free-text answers as entered, choice
/// answers as the option's internal value. Coercion happens when the
/// outbound request is shaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    values: BTreeMap<ProfileField, String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: ProfileField) -> bool {
        self.values.contains_key(&field)
    }

    /// Store a value, replacing any earlier capture.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Captured fields in intake order.
    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}
