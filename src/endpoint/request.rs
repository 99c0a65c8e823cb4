//! Outbound request bodies and the success response.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::intake::{Profile, ProfileField};

/// Fixed instruction sent with the completion request.
pub const COMPLETION_INSTRUCTION: &str = "\
Sulla base dei miei dati personali, preparami un piano alimentare settimanale \
personalizzato con indicazioni sul fabbisogno calorico giornaliero, \
la ripartizione dei macronutrienti e alcuni consigli pratici per raggiungere il mio obiettivo.";

/// A free-chat turn: the user's text and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Profile as the endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub age: Option<u32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub weight: Option<Decimal>,
    pub height: Option<u32>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub dietary_preferences: Option<String>,
}

impl UserData {
    /// Coerce and translate a captured profile.
    pub fn from_profile(profile: &Profile) -> Self {
        let dietary_preferences = profile
            .get(ProfileField::DietaryPreference)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| translate(DIETARY_VOCABULARY, v));

        Self {
            age: profile.get(ProfileField::Age).and_then(parse_integer),
            weight: profile.get(ProfileField::Weight).and_then(parse_decimal),
            height: profile.get(ProfileField::Height).and_then(parse_integer),
            gender: profile
                .get(ProfileField::Gender)
                .map(|v| translate(GENDER_VOCABULARY, v)),
            activity_level: profile
                .get(ProfileField::Activity)
                .map(|v| translate(ACTIVITY_VOCABULARY, v)),
            goal: profile
                .get(ProfileField::Goal)
                .map(|v| translate(GOAL_VOCABULARY, v)),
            dietary_preferences,
        }
    }
}

/// The completion request sent when the user confirms the review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub question: String,
    pub user_data: UserData,
}

impl CompletionRequest {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            question: COMPLETION_INSTRUCTION.to_string(),
            user_data: UserData::from_profile(profile),
        }
    }
}

/// Either body the client may POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundRequest {
    Completion(CompletionRequest),
    Chat(ChatRequest),
}

impl OutboundRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Completion(_) => RequestKind::Completion,
            Self::Chat(_) => RequestKind::Chat,
        }
    }
}

/// Which flow a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Completion,
    Chat,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completion => write!(f, "completion"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

// ── Coercion ────────────────────────────────────────────────────────

const GENDER_VOCABULARY: &[(&str, &str)] = &[
    ("male", "maschio"),
    ("female", "femmina"),
    ("other", "altro"),
];

const ACTIVITY_VOCABULARY: &[(&str, &str)] = &[
    ("sedentary", "sedentario"),
    ("light", "leggero"),
    ("moderate", "moderato"),
    ("active", "attivo"),
    ("very_active", "molto_attivo"),
];

const GOAL_VOCABULARY: &[(&str, &str)] = &[
    ("lose_weight", "perdere_peso"),
    ("maintain", "mantenere_peso"),
    ("gain_muscle", "aumentare_massa_muscolare"),
];

const DIETARY_VOCABULARY: &[(&str, &str)] = &[
    ("vegetarian", "vegetariano"),
    ("vegan", "vegano"),
    ("pescatarian", "pescetariano"),
    ("gluten_free", "senza_glutine"),
    ("lactose_free", "senza_lattosio"),
    ("omnivore", "onnivoro"),
];

/// Map a raw value through `vocabulary`; unknown values pass through.
fn translate(vocabulary: &[(&str, &str)], raw: &str) -> String {
    vocabulary
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(raw.trim()))
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

/// Integer part of a numeric answer; "175.5" becomes 175.
fn parse_integer(raw: &str) -> Option<u32> {
    parse_decimal(raw)
        .filter(|d| !d.is_sign_negative())
        .and_then(|d| d.trunc().to_u32())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn profile(entries: &[(ProfileField, &str)]) -> Profile {
        let mut profile = Profile::new();
        for (field, value) in entries {
            profile.set(*field, *value);
        }
        profile
    }

    #[test]
    fn completion_request_coerces_and_translates() {
        let p = profile(&[
            (ProfileField::Age, "34"),
            (ProfileField::Weight, "70"),
            (ProfileField::Height, "175"),
            (ProfileField::Gender, "male"),
            (ProfileField::Activity, "moderate"),
            (ProfileField::Goal, "lose_weight"),
        ]);
        let request = CompletionRequest::from_profile(&p);
        let data = &request.user_data;

        assert_eq!(data.age, Some(34));
        assert_eq!(data.weight, Some(dec!(70)));
        assert_eq!(data.height, Some(175));
        assert_eq!(data.gender.as_deref(), Some("maschio"));
        assert_eq!(data.activity_level.as_deref(), Some("moderato"));
        assert_eq!(data.goal.as_deref(), Some("perdere_peso"));
        assert_eq!(data.dietary_preferences, None);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["question"], COMPLETION_INSTRUCTION);
        assert_eq!(json["user_data"]["age"], 34);
        assert_eq!(json["user_data"]["weight"].as_f64(), Some(70.0));
        assert_eq!(json["user_data"]["height"], 175);
        assert_eq!(json["user_data"]["gender"], "maschio");
        assert_eq!(json["user_data"]["activity_level"], "moderato");
        assert_eq!(json["user_data"]["goal"], "perdere_peso");
        assert!(json["user_data"]["dietary_preferences"].is_null());
    }

    #[test]
    fn missing_and_unparseable_numbers_become_null() {
        let p = profile(&[(ProfileField::Age, "trenta"), (ProfileField::Weight, "")]);
        let json = serde_json::to_value(UserData::from_profile(&p)).unwrap();
        assert!(json["age"].is_null());
        assert!(json["weight"].is_null());
        assert!(json["height"].is_null());
        assert!(json["gender"].is_null());
        assert!(json["activity_level"].is_null());
        assert!(json["goal"].is_null());
    }

    #[test]
    fn decimal_input_is_coerced() {
        let p = profile(&[
            (ProfileField::Weight, "70,5"),
            (ProfileField::Height, "175.8"),
            (ProfileField::Age, "-3"),
        ]);
        let data = UserData::from_profile(&p);
        assert_eq!(data.weight, Some(dec!(70.5)));
        assert_eq!(data.height, Some(175));
        assert_eq!(data.age, None);
    }

    #[test]
    fn fractions_below_one_are_not_posted_as_zero() {
        let p = profile(&[(ProfileField::Age, "0.5"), (ProfileField::Height, "0")]);
        let data = UserData::from_profile(&p);
        assert_eq!(data.age, None);
        assert_eq!(data.height, None);
    }

    #[test]
    fn unknown_vocabulary_passes_through() {
        let p = profile(&[
            (ProfileField::Gender, "non binario"),
            (ProfileField::Goal, "Gain_Muscle"),
            (ProfileField::DietaryPreference, "niente pesce"),
        ]);
        let data = UserData::from_profile(&p);
        assert_eq!(data.gender.as_deref(), Some("non binario"));
        assert_eq!(data.goal.as_deref(), Some("aumentare_massa_muscolare"));
        assert_eq!(data.dietary_preferences.as_deref(), Some("niente pesce"));
    }

    #[test]
    fn dietary_vocabulary_and_empty_preference() {
        let vegan = profile(&[(ProfileField::DietaryPreference, "vegan")]);
        assert_eq!(
            UserData::from_profile(&vegan).dietary_preferences.as_deref(),
            Some("vegano")
        );

        let none = profile(&[(ProfileField::DietaryPreference, "")]);
        let json = serde_json::to_value(UserData::from_profile(&none)).unwrap();
        assert!(json.as_object().unwrap().contains_key("dietary_preferences"));
        assert!(json["dietary_preferences"].is_null());
    }

    #[test]
    fn chat_request_has_only_question() {
        let body = serde_json::to_value(OutboundRequest::Chat(ChatRequest::new("Cosa mangio?")))
            .unwrap();
        assert_eq!(body, serde_json::json!({ "question": "Cosa mangio?" }));
    }

    #[test]
    fn answer_response_requires_answer() {
        let ok: AnswerResponse = serde_json::from_str(r#"{"answer":"ciao"}"#).unwrap();
        assert_eq!(ok.answer, "ciao");
        assert!(serde_json::from_str::<AnswerResponse>(r#"{"text":"ciao"}"#).is_err());
        assert!(serde_json::from_str::<AnswerResponse>(r#"{"answer":null}"#).is_err());
    }
}
