//! Channel abstraction for session I/O.

pub mod cli;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::intake::Profile;
use crate::transcript::Message;

pub use cli::CliChannel;

/// Stream of raw input lines from the user.
pub type InputStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Where a session reads input from and renders its transcript to.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name, for logs.
    fn name(&self) -> &str;

    /// Begin reading input.
    async fn start(&self) -> Result<InputStream, ChannelError>;

    /// Render one new transcript record.
    async fn show(&self, message: &Message, profile: &Profile) -> Result<(), ChannelError>;

    /// Render the editable profile summary.
    async fn show_profile(&self, profile: &Profile) -> Result<(), ChannelError>;

    /// Show a transient notice that is not part of the transcript.
    async fn notice(&self, text: &str) -> Result<(), ChannelError>;

    /// While held, lines the user types are dropped instead of queued for
    /// the next prompt.
    fn hold_input(&self, _held: bool) {}
}
