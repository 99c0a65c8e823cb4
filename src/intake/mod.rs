//! Intake — the questionnaire that builds a `Profile` before free chat.
//!
//! The session walks through four phases. Introduction asks for consent,
//! DataCollection asks the fixed questions one by one, Review shows an
//! editable summary and sends the completion request, FreeChat forwards
//! every line to the answer endpoint.

pub mod input;
pub mod profile;
pub mod questions;
pub mod session;
pub mod state;

pub use input::interpret;
pub use profile::{Profile, ProfileField};
pub use questions::{ChoiceOption, InputKind, NO_PREFERENCE_LABEL, QUESTIONS, Question, question_for};
pub use session::{Command, Effect, IntakeSession};
pub use state::Phase;
