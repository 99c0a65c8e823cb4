//! Intake phases — which part of the conversation the session is in.

use serde::{Deserialize, Serialize};

/// The phases of an intake session.
///
/// Progresses forward only: Introduction → DataCollection → Review →
/// FreeChat, with a shortcut Introduction → FreeChat when the user declines
/// the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Introduction,
    DataCollection,
    Review,
    FreeChat,
}

impl Phase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Introduction, DataCollection)
                | (Introduction, FreeChat)
                | (DataCollection, Review)
                | (Review, FreeChat)
        )
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Introduction
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Introduction => "introduction",
            Self::DataCollection => "data_collection",
            Self::Review => "review",
            Self::FreeChat => "free_chat",
        };
        write!(f, "{s}")
    }
}
