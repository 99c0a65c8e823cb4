//! Transcript — the ordered, append-only log of chat records.
//!
//! The only removal is the pending-placeholder swap: `replace_pending`
//! drops the placeholder and appends the real response after it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intake::{InputKind, Profile, ProfileField, Question};

/// Who authored a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// A single transcript record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sequence number, monotonic within one transcript.
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// True only while the record stands in for a response being awaited.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    /// Profile field this assistant record asks for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_key: Option<ProfileField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_kind: Option<InputKind>,
    /// Set on the review summary record.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub review: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(id: u64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            pending: false,
            prompt_key: None,
            prompt_kind: None,
            review: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_prompt(&self) -> bool {
        self.prompt_key.is_some()
    }
}

/// Append-only store of `Message`s.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, mut message: Message) -> u64 {
        let id = self.next_id;
        message.id = id;
        self.next_id += 1;
        self.messages.push(message);
        id
    }

    /// Append a plain record and return its id.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> u64 {
        self.push(Message::new(0, sender, text))
    }

    /// Append an assistant record asking `question`.
    pub fn append_prompt(&mut self, question: &Question) -> u64 {
        let mut message = Message::new(0, Sender::Assistant, question.prompt);
        message.prompt_key = Some(question.field);
        message.prompt_kind = Some(question.kind);
        self.push(message)
    }

    /// Append an assistant record offering a choice not tied to a profile
    /// field (the consent question).
    pub fn append_choice(&mut self, text: impl Into<String>) -> u64 {
        let mut message = Message::new(0, Sender::Assistant, text);
        message.prompt_kind = Some(InputKind::Choice);
        self.push(message)
    }

    /// Append the assistant placeholder shown while a response is awaited.
    ///
    /// Any earlier placeholder is dropped first so at most one exists.
    pub fn append_pending(&mut self, text: impl Into<String>) -> u64 {
        self.remove_pending();
        let mut message = Message::new(0, Sender::Assistant, text);
        message.pending = true;
        self.push(message)
    }

    /// Append the review summary record.
    pub fn append_review(&mut self, text: impl Into<String>) -> u64 {
        let mut message = Message::new(0, Sender::Assistant, text);
        message.review = true;
        self.push(message)
    }

    /// Drop the pending placeholder (if any) and append `text` as the
    /// assistant's response.
    pub fn replace_pending(&mut self, text: impl Into<String>) -> u64 {
        self.remove_pending();
        self.append(Sender::Assistant, text)
    }

    fn remove_pending(&mut self) {
        self.messages.retain(|m| !m.pending);
    }

    /// Most recent assistant prompt whose field is not yet in `profile`.
    pub fn latest_unanswered_prompt(&self, profile: &Profile) -> Option<&Message> {
        self.messages.iter().rev().find(|m| {
            m.sender == Sender::Assistant
                && m.prompt_key.is_some_and(|key| !profile.contains(key))
        })
    }

    pub fn pending(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.pending)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records appended after `id`.
    pub fn since(&self, id: u64) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.id > id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::question_for;

    #[test]
    fn ids_are_monotonic_across_pending_swap() {
        let mut t = Transcript::new();
        let a = t.append(Sender::User, "ciao");
        let p = t.append_pending("Sto pensando...");
        let b = t.replace_pending("risposta");

        assert_eq!(a, 1);
        assert_eq!(p, 2);
        assert_eq!(b, 3);
        assert_eq!(t.len(), 2);
        assert!(t.pending().is_none());
        assert_eq!(t.last().unwrap().text, "risposta");
    }

    #[test]
    fn default_transcript_starts_at_one() {
        let mut t = Transcript::default();
        assert_eq!(t.append(Sender::User, "x"), 1);
        assert_eq!(t.append(Sender::User, "y"), 2);
    }

    #[test]
    fn at_most_one_pending() {
        let mut t = Transcript::new();
        t.append_pending("uno");
        t.append_pending("due");
        let pending: Vec<_> = t.messages().iter().filter(|m| m.pending).collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "due");
    }

    #[test]
    fn replace_without_pending_just_appends() {
        let mut t = Transcript::new();
        t.append(Sender::User, "domanda");
        t.replace_pending("risposta");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn latest_unanswered_prompt_skips_captured_fields() {
        let mut t = Transcript::new();
        let mut profile = Profile::new();
        assert!(t.latest_unanswered_prompt(&profile).is_none());

        t.append_prompt(question_for(ProfileField::Age).unwrap());
        t.append(Sender::User, "34");
        let prompt = t.latest_unanswered_prompt(&profile).unwrap();
        assert_eq!(prompt.prompt_key, Some(ProfileField::Age));
        assert_eq!(prompt.prompt_kind, Some(InputKind::Numeric));

        profile.set(ProfileField::Age, "34");
        assert!(t.latest_unanswered_prompt(&profile).is_none());

        t.append_prompt(question_for(ProfileField::Gender).unwrap());
        assert_eq!(
            t.latest_unanswered_prompt(&profile).unwrap().prompt_key,
            Some(ProfileField::Gender)
        );
    }

    #[test]
    fn since_returns_newer_records() {
        let mut t = Transcript::new();
        t.append(Sender::Assistant, "a");
        let b = t.append(Sender::User, "b");
        t.append(Sender::Assistant, "c");
        let texts: Vec<_> = t.since(b - 1).map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn review_flag_serializes_only_when_set() {
        let mut t = Transcript::new();
        t.append(Sender::Assistant, "plain");
        t.append_review("summary");
        let plain = serde_json::to_value(&t.messages()[0]).unwrap();
        let review = serde_json::to_value(&t.messages()[1]).unwrap();
        assert!(plain.get("review").is_none());
        assert_eq!(review["review"], true);
        assert_eq!(review["sender"], "assistant");
    }
}
