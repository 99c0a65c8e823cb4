//! The static questionnaire and per-kind answer validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::profile::ProfileField;
use crate::error::InputError;

/// Up to three integer digits, optionally a `.` or `,` and one or two decimals.
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}([.,]\d{1,2})?$").expect("valid numeric regex"));

/// What kind of input control a question uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Numeric,
    Choice,
    Freetext,
}

/// One selectable option: what the user sees and what gets stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn opt(label: &'static str, value: &'static str) -> ChoiceOption {
    ChoiceOption { label, value }
}

/// A fixed questionnaire entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub field: ProfileField,
    pub prompt: &'static str,
    pub kind: InputKind,
    pub options: &'static [ChoiceOption],
    pub placeholder: Option<&'static str>,
}

/// Intake order.
pub static QUESTIONS: &[Question] = &[
    Question {
        field: ProfileField::Age,
        prompt: "Quanti anni hai?",
        kind: InputKind::Numeric,
        options: &[],
        placeholder: Some("Es. 34"),
    },
    Question {
        field: ProfileField::Gender,
        prompt: "Qual è il tuo sesso?",
        kind: InputKind::Choice,
        options: &[
            opt("Maschio", "male"),
            opt("Femmina", "female"),
            opt("Altro", "other"),
        ],
        placeholder: None,
    },
    Question {
        field: ProfileField::Weight,
        prompt: "Quanto pesi? (in kg)",
        kind: InputKind::Numeric,
        options: &[],
        placeholder: Some("Es. 70"),
    },
    Question {
        field: ProfileField::Height,
        prompt: "Quanto sei alto/a? (in cm)",
        kind: InputKind::Numeric,
        options: &[],
        placeholder: Some("Es. 175"),
    },
    Question {
        field: ProfileField::Activity,
        prompt: "Qual è il tuo livello di attività fisica?",
        kind: InputKind::Choice,
        options: &[
            opt("Sedentario", "sedentary"),
            opt("Leggermente attivo", "light"),
            opt("Moderatamente attivo", "moderate"),
            opt("Molto attivo", "active"),
            opt("Estremamente attivo", "very_active"),
        ],
        placeholder: None,
    },
    Question {
        field: ProfileField::Goal,
        prompt: "Qual è il tuo obiettivo principale?",
        kind: InputKind::Choice,
        options: &[
            opt("Perdere peso", "lose_weight"),
            opt("Mantenere il peso", "maintain"),
            opt("Aumentare la massa muscolare", "gain_muscle"),
        ],
        placeholder: None,
    },
    Question {
        field: ProfileField::DietaryPreference,
        prompt: "Hai preferenze alimentari o intolleranze? (lascia vuoto se nessuna)",
        kind: InputKind::Freetext,
        options: &[],
        placeholder: Some("Es. vegetariano, senza lattosio"),
    },
];

/// Shown in place of an empty dietary preference.
pub const NO_PREFERENCE_LABEL: &str = "Nessuna preferenza";

/// Look up the question that asks for `field`.
pub fn question_for(field: ProfileField) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.field == field)
}

impl Question {
    /// Validate raw input and return the value to store.
    ///
    /// Choice questions accept a 1-based option number, the label or the
    /// internal value (case-insensitive) and always return the internal value.
    pub fn accept(&self, raw: &str) -> Result<String, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return if self.field.allows_empty() && self.kind == InputKind::Freetext {
                Ok(String::new())
            } else {
                Err(InputError::EmptyAnswer)
            };
        }

        match self.kind {
            InputKind::Numeric => accept_numeric(self.field, trimmed),
            InputKind::Choice => self
                .resolve_option(trimmed)
                .map(|o| o.value.to_string())
                .ok_or_else(|| InputError::UnknownChoice(trimmed.to_string())),
            InputKind::Freetext => Ok(trimmed.to_string()),
        }
    }

    /// Find the option matching a number, label or value.
    pub fn resolve_option(&self, input: &str) -> Option<&'static ChoiceOption> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.options.get(i));
        }
        self.options.iter().find(|o| {
            o.label.eq_ignore_ascii_case(input) || o.value.eq_ignore_ascii_case(input)
        })
    }

    /// Text for the user's transcript record: the option label for choice
    /// answers, a fixed label for an empty answer, otherwise the value.
    pub fn display_value(&self, value: &str) -> String {
        if value.is_empty() {
            return NO_PREFERENCE_LABEL.to_string();
        }
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.to_string())
            .unwrap_or_else(|| value.to_string())
    }
}

/// Whole-number fields are truncated when posted, so they need an integer
/// part of at least 1.
fn accept_numeric(field: ProfileField, input: &str) -> Result<String, InputError> {
    if !NUMERIC.is_match(input) {
        return Err(InputError::NotNumeric);
    }
    let minimum = if field.is_whole_number() { 1.0 } else { f64::MIN_POSITIVE };
    let in_range = input
        .replace(',', ".")
        .parse::<f64>()
        .map(|v| v >= minimum)
        .unwrap_or(false);
    if !in_range {
        return Err(InputError::NotNumeric);
    }
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(field: ProfileField) -> &'static Question {
        question_for(field).unwrap()
    }

    #[test]
    fn questionnaire_covers_every_field_in_order() {
        let fields: Vec<_> = QUESTIONS.iter().map(|q| q.field).collect();
        assert_eq!(fields, ProfileField::ALL.to_vec());
    }

    #[test]
    fn choice_questions_have_options() {
        for q in QUESTIONS {
            assert_eq!(
                q.kind == InputKind::Choice,
                !q.options.is_empty(),
                "options mismatch for {}",
                q.field
            );
        }
    }

    #[test]
    fn numeric_policy() {
        let age = question(ProfileField::Age);
        assert_eq!(age.accept("34").unwrap(), "34");
        assert_eq!(age.accept(" 34 ").unwrap(), "34");

        let weight = question(ProfileField::Weight);
        assert_eq!(weight.accept("70,5").unwrap(), "70,5");
        assert_eq!(weight.accept("70.25").unwrap(), "70.25");

        assert_eq!(weight.accept("abc"), Err(InputError::NotNumeric));
        assert_eq!(weight.accept("1000"), Err(InputError::NotNumeric));
        assert_eq!(weight.accept("70.123"), Err(InputError::NotNumeric));
        assert_eq!(weight.accept("-5"), Err(InputError::NotNumeric));
        assert_eq!(weight.accept("0"), Err(InputError::NotNumeric));
        assert_eq!(weight.accept(""), Err(InputError::EmptyAnswer));
    }

    #[test]
    fn whole_number_fields_need_an_integer_part() {
        let weight = question(ProfileField::Weight);
        assert_eq!(weight.accept("0.5").unwrap(), "0.5");

        for field in [ProfileField::Age, ProfileField::Height] {
            let q = question(field);
            assert_eq!(q.accept("0.5"), Err(InputError::NotNumeric));
            assert_eq!(q.accept("0,99"), Err(InputError::NotNumeric));
            assert_eq!(q.accept("1.5").unwrap(), "1.5");
        }
    }

    #[test]
    fn choice_accepts_number_label_or_value() {
        let gender = question(ProfileField::Gender);
        assert_eq!(gender.accept("1").unwrap(), "male");
        assert_eq!(gender.accept("femmina").unwrap(), "female");
        assert_eq!(gender.accept("OTHER").unwrap(), "other");
        assert_eq!(
            gender.accept("4"),
            Err(InputError::UnknownChoice("4".to_string()))
        );
        assert_eq!(
            gender.accept("0"),
            Err(InputError::UnknownChoice("0".to_string()))
        );
        assert_eq!(gender.accept("  "), Err(InputError::EmptyAnswer));
    }

    #[test]
    fn empty_freetext_only_for_dietary_preference() {
        let diet = question(ProfileField::DietaryPreference);
        assert_eq!(diet.accept("").unwrap(), "");
        assert_eq!(diet.accept("   ").unwrap(), "");
        assert_eq!(diet.accept(" vegano ").unwrap(), "vegano");
    }

    #[test]
    fn display_value_uses_labels() {
        let goal = question(ProfileField::Goal);
        assert_eq!(goal.display_value("lose_weight"), "Perdere peso");
        assert_eq!(goal.display_value("custom"), "custom");

        let diet = question(ProfileField::DietaryPreference);
        assert_eq!(diet.display_value(""), NO_PREFERENCE_LABEL);
    }
}
