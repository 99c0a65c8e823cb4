//! Error types for nutri-chat.

use std::time::Duration;

use crate::intake::{Phase, ProfileField};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the answer endpoint.
///
/// None of these are surfaced verbatim to the user: every variant resolves
/// to the same fallback record in the transcript.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Endpoint {endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedBody { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Commands the state machine refuses in its current state.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Command {command} is not valid in phase {phase}")]
    UnexpectedCommand { phase: Phase, command: &'static str },

    #[error("Answer for {got} does not match the current question ({expected:?})")]
    UnexpectedField {
        expected: Option<ProfileField>,
        got: ProfileField,
    },

    #[error("Field {0} has no captured value to edit")]
    FieldNotCaptured(ProfileField),

    #[error("Invalid answer: {0}")]
    InvalidAnswer(#[from] InputError),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },
}

/// Rejections raised by the input control before a command is built.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Attendi la risposta prima di scrivere ancora.")]
    Busy,

    #[error("Scrivi un messaggio.")]
    EmptyMessage,

    #[error("Questa risposta non può essere vuota.")]
    EmptyAnswer,

    #[error("Inserisci un numero valido (es. 70 oppure 70,5).")]
    NotNumeric,

    #[error("Scelta non valida: {0}")]
    UnknownChoice(String),

    #[error("Campo sconosciuto: {0}")]
    UnknownField(String),

    #[error("Comando non riconosciuto. Scrivi \"conferma\" oppure \"modifica <campo>\".")]
    UnknownReviewCommand,

    #[error("Stai modificando un campo: scrivi il nuovo valore oppure \"annulla\".")]
    EditInProgress,
}

/// Channel I/O errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to write on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
