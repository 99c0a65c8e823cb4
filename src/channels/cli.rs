//! CLI channel — stdin/stdout chat.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use crate::channels::{Channel, InputStream};
use crate::error::ChannelError;
use crate::intake::session::{NO_LABEL, YES_LABEL};
use crate::intake::{InputKind, Profile, ProfileField, question_for};
use crate::transcript::{Message, Sender};

/// Reads lines from stdin and prints the transcript to stdout.
pub struct CliChannel {
    held: Arc<AtomicBool>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            held: Arc::new(AtomicBool::new(false)),
        }
    }

    fn print(&self, text: &str) -> Result<(), ChannelError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\n{text}\n")
            .and_then(|()| out.flush())
            .map_err(|e| ChannelError::SendFailed {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;
        eprint!("> ");
        Ok(())
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward lines from `reader` until EOF, dropping those read while `held`.
async fn forward_lines<R>(reader: R, tx: UnboundedSender<String>, held: Arc<AtomicBool>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            // Empty lines are forwarded: an empty dietary preference is an answer.
            Ok(Some(line)) => {
                if held.load(Ordering::SeqCst) {
                    tracing::debug!("Dropping line typed while busy");
                    continue;
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break, // EOF
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<InputStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let held = Arc::clone(&self.held);

        tokio::spawn(async move {
            forward_lines(BufReader::new(tokio::io::stdin()), tx, held).await;
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (line, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn show(&self, message: &Message, profile: &Profile) -> Result<(), ChannelError> {
        if message.pending {
            eprintln!("⏳ {}", message.text);
            return Ok(());
        }
        match render_message(message, profile) {
            Some(rendered) => self.print(&rendered),
            None => Ok(()),
        }
    }

    async fn show_profile(&self, profile: &Profile) -> Result<(), ChannelError> {
        self.print(&render_summary(profile))
    }

    async fn notice(&self, text: &str) -> Result<(), ChannelError> {
        eprintln!("ℹ️  {}", text);
        eprint!("> ");
        Ok(())
    }

    fn hold_input(&self, held: bool) {
        self.held.store(held, Ordering::SeqCst);
    }
}

/// Text for a transcript record, or `None` for records the terminal already
/// shows (the user's own lines).
pub fn render_message(message: &Message, profile: &Profile) -> Option<String> {
    if message.sender == Sender::User {
        return None;
    }

    let mut parts = vec![message.text.clone()];

    if let Some(question) = message.prompt_key.and_then(question_for) {
        for (i, option) in question.options.iter().enumerate() {
            parts.push(format!("  {}) {}", i + 1, option.label));
        }
        if let Some(placeholder) = question.placeholder {
            parts.push(format!("  ({placeholder})"));
        }
    } else if message.prompt_kind == Some(InputKind::Choice) {
        parts.push(format!("  1) {YES_LABEL}"));
        parts.push(format!("  2) {NO_LABEL}"));
    }

    if message.review {
        parts.push(render_summary(profile));
    }

    Some(parts.join("\n"))
}

/// The review summary with edit instructions.
pub fn render_summary(profile: &Profile) -> String {
    let mut parts = vec!["Riepilogo:".to_string()];
    for (field, value) in profile.iter() {
        let shown = question_for(field)
            .map(|q| q.display_value(value))
            .unwrap_or_else(|| value.to_string());
        parts.push(format!("- {}: {}", field.label(), shown));
    }

    let aliases: Vec<&str> = ProfileField::ALL
        .iter()
        .filter(|f| profile.contains(**f))
        .map(|f| f.alias())
        .collect();
    parts.push(format!(
        "Scrivi \"conferma\" per ricevere il tuo piano, oppure \"modifica <campo>\" ({}).",
        aliases.join(", ")
    ));
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Transcript;

    #[test]
    fn user_records_are_not_reprinted() {
        let mut t = Transcript::new();
        t.append(Sender::User, "34");
        assert!(render_message(&t.messages()[0], &Profile::new()).is_none());
    }

    #[test]
    fn prompts_list_numbered_options() {
        let mut t = Transcript::new();
        t.append_prompt(question_for(ProfileField::Gender).unwrap());
        let rendered = render_message(&t.messages()[0], &Profile::new()).unwrap();
        assert!(rendered.contains("Qual è il tuo sesso?"));
        assert!(rendered.contains("1) Maschio"));
        assert!(rendered.contains("3) Altro"));
    }

    #[test]
    fn numeric_prompts_show_placeholder() {
        let mut t = Transcript::new();
        t.append_prompt(question_for(ProfileField::Age).unwrap());
        let rendered = render_message(&t.messages()[0], &Profile::new()).unwrap();
        assert!(rendered.contains("(Es. 34)"));
    }

    #[test]
    fn consent_shows_yes_no() {
        let mut t = Transcript::new();
        t.append_choice("Vuoi procedere?");
        let rendered = render_message(&t.messages()[0], &Profile::new()).unwrap();
        assert!(rendered.contains("1) Sì"));
        assert!(rendered.contains("2) No"));
    }

    #[test]
    fn review_record_includes_summary() {
        let mut profile = Profile::new();
        profile.set(ProfileField::Age, "34");
        profile.set(ProfileField::Goal, "maintain");
        profile.set(ProfileField::DietaryPreference, "");

        let mut t = Transcript::new();
        t.append_review("Riepilogo pronto");
        let rendered = render_message(&t.messages()[0], &profile).unwrap();
        assert!(rendered.contains("- Età: 34"));
        assert!(rendered.contains("- Obiettivo: Mantenere il peso"));
        assert!(rendered.contains("- Preferenze alimentari: Nessuna preferenza"));
        assert!(rendered.contains("(eta, obiettivo, dieta)"));
    }

    #[tokio::test]
    async fn lines_typed_while_held_are_dropped() {
        let held = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        forward_lines(BufReader::new(&b"70\n70\n"[..]), tx, Arc::clone(&held)).await;
        assert!(rx.try_recv().is_err());

        held.store(false, Ordering::SeqCst);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        forward_lines(BufReader::new(&b"175\n\n"[..]), tx, held).await;
        assert_eq!(rx.try_recv().unwrap(), "175");
        assert_eq!(rx.try_recv().unwrap(), "");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn hold_input_toggles_the_shared_flag() {
        let channel = CliChannel::new();
        channel.hold_input(true);
        assert!(channel.held.load(Ordering::SeqCst));
        channel.hold_input(false);
        assert!(!channel.held.load(Ordering::SeqCst));
    }
}
