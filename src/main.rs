use std::sync::Arc;

use nutri_chat::channels::CliChannel;
use nutri_chat::config::ClientConfig;
use nutri_chat::driver::ChatDriver;
use nutri_chat::endpoint::HttpAnswerClient;
use nutri_chat::error::Result;
use nutri_chat::intake::IntakeSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let session = run_cli().await?;
    tracing::info!(
        session_id = %session.id(),
        profile_fields = session.profile().len(),
        "Bye"
    );
    Ok(())
}

async fn run_cli() -> Result<IntakeSession> {
    let config = ClientConfig::from_env()?;

    eprintln!("🥗 nutri-chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Endpoint: {}", config.endpoint);
    eprintln!("   Type /esci to quit.\n");

    let client = Arc::new(HttpAnswerClient::new(&config)?);
    let session = IntakeSession::new(config.question_delay);
    ChatDriver::new(session, Arc::new(CliChannel::new()), client)
        .run()
        .await
}
