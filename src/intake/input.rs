//! Input control — turns a raw line into a `Command`.
//!
//! Anything the state machine would have to reject for being malformed is
//! refused here, so invalid submissions never reach `dispatch`.

use super::profile::ProfileField;
use super::session::{Command, IntakeSession};
use super::state::Phase;
use crate::error::InputError;

/// Interpret `line` against the session's current state.
pub fn interpret(line: &str, session: &IntakeSession) -> Result<Command, InputError> {
    if !session.is_interactive() {
        return Err(InputError::Busy);
    }

    let trimmed = line.trim();
    match session.phase() {
        Phase::Introduction => parse_consent(trimmed),
        Phase::DataCollection => {
            let question = session.current_question().ok_or(InputError::Busy)?;
            let value = question.accept(trimmed)?;
            Ok(Command::QuestionAnswered {
                field: question.field,
                value,
            })
        }
        Phase::Review => parse_review(trimmed, session.editing()),
        Phase::FreeChat => {
            if trimmed.is_empty() {
                return Err(InputError::EmptyMessage);
            }
            Ok(Command::ChatSent {
                text: trimmed.to_string(),
            })
        }
    }
}

fn parse_consent(input: &str) -> Result<Command, InputError> {
    match input.to_lowercase().as_str() {
        "sì" | "si" | "s" | "yes" | "y" | "1" => Ok(Command::IntroductionAnswered { proceed: true }),
        "no" | "n" | "2" => Ok(Command::IntroductionAnswered { proceed: false }),
        _ => Err(InputError::UnknownChoice(input.to_string())),
    }
}

fn parse_review(input: &str, editing: Option<ProfileField>) -> Result<Command, InputError> {
    let lower = input.to_lowercase();

    if let Some(field) = editing {
        if is_review_command(&lower) {
            return Err(InputError::EditInProgress);
        }
        return Ok(match lower.as_str() {
            "annulla" => Command::EditCancelled,
            _ => Command::EditSaved {
                field,
                value: input.to_string(),
            },
        });
    }

    match lower.as_str() {
        "conferma" | "ok" => Ok(Command::ReviewConfirmed),
        _ => {
            let rest = lower
                .strip_prefix("modifica")
                .ok_or(InputError::UnknownReviewCommand)?
                .trim();
            if rest.is_empty() {
                return Err(InputError::UnknownReviewCommand);
            }
            let field = rest.parse::<ProfileField>()?;
            Ok(Command::EditStarted { field })
        }
    }
}

/// `conferma`, `ok` and `modifica ...` are never stored as an edited value.
fn is_review_command(lower: &str) -> bool {
    matches!(lower, "conferma" | "ok")
        || lower == "modifica"
        || lower.starts_with("modifica ")
}
