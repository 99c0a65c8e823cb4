//! ChatDriver — runs one session over a channel.
//!
//! The driver is the only place that waits: it sleeps for the pacing delay
//! and awaits the answer client, then feeds the outcome back into the
//! session as a command. Effects run one at a time and input is held while
//! they do, so at most one request is ever outstanding and nothing typed
//! meanwhile is answered against the next prompt.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::StreamExt;

use crate::channels::Channel;
use crate::endpoint::AnswerClient;
use crate::error::{ChannelError, Result};
use crate::intake::{Command, Effect, IntakeSession, Phase, interpret};
use crate::transcript::Message;

/// Lines that end the session.
const QUIT_COMMANDS: &[&str] = &["/esci", "/quit", "/exit"];

/// Notice shown once the completion request has settled.
const FREE_CHAT_NOTICE: &str = "Ora puoi farmi qualsiasi domanda.";

pub struct ChatDriver {
    session: IntakeSession,
    channel: Arc<dyn Channel>,
    client: Arc<dyn AnswerClient>,
    /// Id of the last record handed to the channel.
    rendered_upto: u64,
}

impl ChatDriver {
    pub fn new(
        session: IntakeSession,
        channel: Arc<dyn Channel>,
        client: Arc<dyn AnswerClient>,
    ) -> Self {
        Self {
            session,
            channel,
            client,
            rendered_upto: 0,
        }
    }

    /// Greet, then process input lines until EOF or a quit command.
    /// Returns the session as it ended.
    pub async fn run(mut self) -> Result<IntakeSession> {
        let mut input = self.channel.start().await?;
        tracing::info!(
            session_id = %self.session.id(),
            channel = self.channel.name(),
            "Session started"
        );

        self.handle(Command::Start).await?;

        while let Some(line) = input.next().await {
            if QUIT_COMMANDS.contains(&line.trim().to_lowercase().as_str()) {
                break;
            }
            self.handle_line(&line).await?;
        }

        tracing::info!(
            session_id = %self.session.id(),
            phase = %self.session.phase(),
            messages = self.session.transcript().len(),
            "Session ended"
        );
        Ok(self.session)
    }

    /// Interpret one raw line and process it.
    pub async fn handle_line(&mut self, line: &str) -> std::result::Result<(), ChannelError> {
        match interpret(line, &self.session) {
            Ok(command) => self.handle(command).await,
            Err(e) => {
                tracing::debug!(session_id = %self.session.id(), error = %e, "Input rejected");
                self.channel.notice(&e.to_string()).await
            }
        }
    }

    /// Dispatch `command` and every command its effects produce.
    pub async fn handle(&mut self, command: Command) -> std::result::Result<(), ChannelError> {
        let mut queue = VecDeque::from([command]);
        let mut holding = false;

        while let Some(command) = queue.pop_front() {
            let edit_started = matches!(command, Command::EditStarted { .. });
            let edit_finished = matches!(
                command,
                Command::EditSaved { .. } | Command::EditCancelled
            );
            let phase_before = self.session.phase();

            let effects = match self.session.dispatch(command) {
                Ok(effects) => effects,
                Err(e) => {
                    tracing::warn!(session_id = %self.session.id(), "Command rejected: {e}");
                    self.channel.notice(&e.to_string()).await?;
                    continue;
                }
            };

            self.flush().await?;

            if edit_started {
                if let Some(field) = self.session.editing() {
                    self.channel
                        .notice(&format!(
                            "Nuovo valore per {} (oppure \"annulla\"):",
                            field.label()
                        ))
                        .await?;
                }
            }
            if edit_finished {
                self.channel.show_profile(self.session.profile()).await?;
            }
            if phase_before == Phase::Review && self.session.phase() == Phase::FreeChat {
                self.channel.notice(FREE_CHAT_NOTICE).await?;
            }

            if !effects.is_empty() && !holding {
                self.channel.hold_input(true);
                holding = true;
            }
            for effect in effects {
                queue.push_back(self.execute(effect).await);
            }
        }

        if holding {
            self.channel.hold_input(false);
        }
        Ok(())
    }

    async fn execute(&self, effect: Effect) -> Command {
        match effect {
            Effect::ScheduleAdvance(delay) => {
                tokio::time::sleep(delay).await;
                Command::AdvanceDue
            }
            Effect::Send(request) => match self.client.ask(&request).await {
                Ok(answer) => Command::RequestSucceeded { answer },
                Err(e) => Command::RequestFailed {
                    reason: e.to_string(),
                },
            },
        }
    }

    /// Hand every record the channel has not seen yet to it.
    async fn flush(&mut self) -> std::result::Result<(), ChannelError> {
        let fresh: Vec<Message> = self
            .session
            .transcript()
            .since(self.rendered_upto)
            .cloned()
            .collect();
        for message in &fresh {
            self.channel.show(message, self.session.profile()).await?;
            self.rendered_upto = message.id;
        }
        Ok(())
    }
}
