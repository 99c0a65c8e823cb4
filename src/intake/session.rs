//! IntakeSession — the single owner of transcript, profile and phase.
//!
//! Every user action and every request outcome enters through
//! [`IntakeSession::dispatch`], which mutates the session and returns the
//! side effects the caller has to carry out. The session itself never
//! sleeps or performs I/O.

use std::collections::HashSet;
use std::time::Duration;

use uuid::Uuid;

use super::profile::{Profile, ProfileField};
use super::questions::{QUESTIONS, Question};
use super::state::Phase;
use crate::endpoint::{ChatRequest, CompletionRequest, OutboundRequest, RequestKind};
use crate::error::TransitionError;
use crate::transcript::{Sender, Transcript};

/// Greeting and consent question shown at session start.
pub const GREETING: &str = "Ciao! Sono la tua nutrizionista AI. Per darti consigli su misura \
vorrei farti qualche domanda su di te. Vuoi procedere?";
/// First assistant record after the questionnaire is declined.
pub const FREE_CHAT_OPENER: &str = "Ciao! Sono la tua nutrizionista AI. Come posso aiutarti oggi?";
/// Shown while a request is in flight.
pub const THINKING: &str = "Sto pensando...";
/// Replaces the placeholder when a request fails for any reason.
pub const FALLBACK_ANSWER: &str = "Mi dispiace, si è verificato un errore. Riprova più tardi.";
/// Summary record that opens the review.
pub const REVIEW_SUMMARY: &str = "Perfetto, ho raccolto tutti i tuoi dati! Controlla il riepilogo: \
puoi modificare qualsiasi campo prima di confermare.";

pub const YES_LABEL: &str = "Sì";
pub const NO_LABEL: &str = "No";

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the session (emits the greeting once).
    Start,
    IntroductionAnswered { proceed: bool },
    QuestionAnswered { field: ProfileField, value: String },
    /// The pacing delay after an answer has elapsed.
    AdvanceDue,
    EditStarted { field: ProfileField },
    EditSaved { field: ProfileField, value: String },
    EditCancelled,
    ReviewConfirmed,
    ChatSent { text: String },
    RequestSucceeded { answer: String },
    RequestFailed { reason: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::IntroductionAnswered { .. } => "introduction_answered",
            Self::QuestionAnswered { .. } => "question_answered",
            Self::AdvanceDue => "advance_due",
            Self::EditStarted { .. } => "edit_started",
            Self::EditSaved { .. } => "edit_saved",
            Self::EditCancelled => "edit_cancelled",
            Self::ReviewConfirmed => "review_confirmed",
            Self::ChatSent { .. } => "chat_sent",
            Self::RequestSucceeded { .. } => "request_succeeded",
            Self::RequestFailed { .. } => "request_failed",
        }
    }
}

/// Side effects requested by [`IntakeSession::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Wait, then dispatch [`Command::AdvanceDue`].
    ScheduleAdvance(Duration),
    /// Post the request, then dispatch `RequestSucceeded` or `RequestFailed`.
    Send(OutboundRequest),
}

/// One conversational intake session.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    id: Uuid,
    phase: Phase,
    question_index: usize,
    transcript: Transcript,
    profile: Profile,
    /// Fields whose prompt has been answered once; later submissions for
    /// the same prompt are dropped.
    answered: HashSet<ProfileField>,
    /// Set between an accepted answer and the following `AdvanceDue`.
    advancing: bool,
    editing: Option<ProfileField>,
    in_flight: Option<RequestKind>,
    question_delay: Duration,
}

impl IntakeSession {
    pub fn new(question_delay: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::default(),
            question_index: 0,
            transcript: Transcript::new(),
            profile: Profile::new(),
            answered: HashSet::new(),
            advancing: false,
            editing: None,
            in_flight: None,
            question_delay,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Field currently being edited during review.
    pub fn editing(&self) -> Option<ProfileField> {
        self.editing
    }

    /// The question awaiting an answer, if the questionnaire is running and
    /// no advance is pending.
    pub fn current_question(&self) -> Option<&'static Question> {
        if self.phase != Phase::DataCollection || self.advancing {
            return None;
        }
        QUESTIONS.get(self.question_index)
    }

    pub fn answered(&self, field: ProfileField) -> bool {
        self.answered.contains(&field)
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the session accepts user input right now.
    pub fn is_interactive(&self) -> bool {
        !self.is_loading() && !self.advancing
    }

    /// Apply `command` and return the effects to carry out.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Effect>, TransitionError> {
        tracing::debug!(
            session_id = %self.id,
            phase = %self.phase,
            command = command.name(),
            "Dispatching command"
        );

        match command {
            Command::Start => Ok(self.start()),
            Command::RequestSucceeded { answer } => Ok(self.settle(answer)),
            Command::RequestFailed { reason } => {
                tracing::warn!(session_id = %self.id, %reason, "Request failed");
                Ok(self.settle(FALLBACK_ANSWER.to_string()))
            }
            command => match self.phase {
                Phase::Introduction => self.on_introduction(command),
                Phase::DataCollection => self.on_data_collection(command),
                Phase::Review => self.on_review(command),
                Phase::FreeChat => self.on_free_chat(command),
            },
        }
    }

    fn start(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Introduction && self.transcript.is_empty() {
            self.transcript.append_choice(GREETING);
        }
        Vec::new()
    }

    fn on_introduction(&mut self, command: Command) -> Result<Vec<Effect>, TransitionError> {
        match command {
            Command::IntroductionAnswered { proceed: true } => {
                self.transcript.append(Sender::User, YES_LABEL);
                self.transition(Phase::DataCollection)?;
                self.question_index = 0;
                self.ask_current();
                Ok(Vec::new())
            }
            Command::IntroductionAnswered { proceed: false } => {
                self.transcript.append(Sender::User, NO_LABEL);
                self.transition(Phase::FreeChat)?;
                self.transcript.append(Sender::Assistant, FREE_CHAT_OPENER);
                Ok(Vec::new())
            }
            other => Err(self.unexpected(&other)),
        }
    }

    fn on_data_collection(&mut self, command: Command) -> Result<Vec<Effect>, TransitionError> {
        match command {
            Command::QuestionAnswered { field, value } => self.answer(field, value),
            Command::AdvanceDue => {
                if !self.advancing {
                    tracing::debug!(session_id = %self.id, "No advance pending");
                    return Ok(Vec::new());
                }
                self.advancing = false;
                if self.question_index < QUESTIONS.len() {
                    self.ask_current();
                } else {
                    self.transition(Phase::Review)?;
                    self.transcript.append_review(REVIEW_SUMMARY);
                }
                Ok(Vec::new())
            }
            other => Err(self.unexpected(&other)),
        }
    }

    fn answer(&mut self, field: ProfileField, value: String) -> Result<Vec<Effect>, TransitionError> {
        if self.advancing || self.answered.contains(&field) {
            tracing::debug!(session_id = %self.id, %field, "Ignoring duplicate answer");
            return Ok(Vec::new());
        }

        let question = QUESTIONS
            .get(self.question_index)
            .filter(|q| q.field == field)
            .ok_or(TransitionError::UnexpectedField {
                expected: QUESTIONS.get(self.question_index).map(|q| q.field),
                got: field,
            })?;
        let value = question.accept(&value)?;

        self.transcript
            .append(Sender::User, question.display_value(&value));
        self.profile.set(field, value);
        self.answered.insert(field);
        self.question_index += 1;
        self.advancing = true;

        Ok(vec![Effect::ScheduleAdvance(self.question_delay)])
    }

    fn on_review(&mut self, command: Command) -> Result<Vec<Effect>, TransitionError> {
        if self.is_loading() {
            tracing::debug!(session_id = %self.id, command = command.name(), "Ignoring command while loading");
            return Ok(Vec::new());
        }

        match command {
            Command::EditStarted { field } => {
                if !self.profile.contains(field) {
                    return Err(TransitionError::FieldNotCaptured(field));
                }
                self.editing = Some(field);
                Ok(Vec::new())
            }
            Command::EditSaved { field, value } => {
                if !self.profile.contains(field) {
                    return Err(TransitionError::FieldNotCaptured(field));
                }
                tracing::info!(session_id = %self.id, %field, "Profile field edited");
                self.profile.set(field, value.trim());
                self.editing = None;
                Ok(Vec::new())
            }
            Command::EditCancelled => {
                self.editing = None;
                Ok(Vec::new())
            }
            Command::ReviewConfirmed => {
                self.editing = None;
                let request = CompletionRequest::from_profile(&self.profile);
                Ok(vec![self.begin_request(OutboundRequest::Completion(request))])
            }
            other => Err(self.unexpected(&other)),
        }
    }

    fn on_free_chat(&mut self, command: Command) -> Result<Vec<Effect>, TransitionError> {
        match command {
            Command::ChatSent { text } => {
                if self.is_loading() {
                    tracing::debug!(session_id = %self.id, "Ignoring chat while loading");
                    return Ok(Vec::new());
                }
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Ok(Vec::new());
                }
                self.transcript.append(Sender::User, text.clone());
                Ok(vec![self.begin_request(OutboundRequest::Chat(ChatRequest::new(text)))])
            }
            other => Err(self.unexpected(&other)),
        }
    }

    fn begin_request(&mut self, request: OutboundRequest) -> Effect {
        self.transcript.append_pending(THINKING);
        self.in_flight = Some(request.kind());
        Effect::Send(request)
    }

    /// Resolve the in-flight request with `text`, whatever the outcome.
    fn settle(&mut self, text: String) -> Vec<Effect> {
        let Some(kind) = self.in_flight.take() else {
            tracing::debug!(session_id = %self.id, "No request in flight; ignoring outcome");
            return Vec::new();
        };
        self.transcript.replace_pending(text);

        if kind == RequestKind::Completion && self.phase == Phase::Review {
            if let Err(e) = self.transition(Phase::FreeChat) {
                tracing::warn!(session_id = %self.id, "{e}");
            }
        }
        Vec::new()
    }

    fn ask_current(&mut self) {
        if let Some(question) = QUESTIONS.get(self.question_index) {
            self.transcript.append_prompt(question);
        }
    }

    fn transition(&mut self, target: Phase) -> Result<(), TransitionError> {
        if !self.phase.can_transition_to(target) {
            return Err(TransitionError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }
        tracing::info!(session_id = %self.id, from = %self.phase, to = %target, "Phase transition");
        self.phase = target;
        Ok(())
    }

    fn unexpected(&self, command: &Command) -> TransitionError {
        TransitionError::UnexpectedCommand {
            phase: self.phase,
            command: command.name(),
        }
    }
}
