//! MindEase application binary - composition root.
//!
//! Server mode (default): load configuration, read secrets from the
//! environment, build the completion gateway and credential issuer, and
//! serve the HTTP mediator.
//!
//! Chat mode (`--chat`): run a terminal client that drives a
//! ConversationSession against a running server, printing each reply with
//! its mood score and the derived theme. `/join`, `/mute`, and `/leave`
//! drive a VoiceSession whose transport is the in-memory implementation
//! (this host has no real-time audio stack).

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mindease_api::{routes, AppState};
use mindease_core::config::{MindEaseConfig, Secrets};
use mindease_core::types::MoodTheme;
use mindease_gateway::{ChatCompletion, CompletionGateway};
use mindease_rtc::CredentialIssuer;
use mindease_session::{
    ChatApiClient, ConversationSession, CredentialSource, JsonFileMoodStore, MockVoiceTransport,
    NullSpeech, SubmitOutcome, VoiceSession, VoiceTransport,
};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::CliArgs::parse();

    tracing::info!("Starting MindEase v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let config = MindEaseConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let port = args.resolve_port(config.general.port);

    if args.chat {
        let server = args.resolve_server(port);
        return run_chat_client(&server, &config).await;
    }

    // Secrets come from the environment, never the config file.
    let secrets = Secrets::from_env();
    if secrets.completion_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set — chat turns will return the provider's auth error");
    }
    if secrets.rtc_app_id.is_none() || secrets.rtc_app_certificate.is_none() {
        tracing::warn!("AGORA_APP_ID/AGORA_APP_CERTIFICATE not set — token endpoint will fail");
    }

    let gateway = CompletionGateway::new(&config.completion, secrets.completion_api_key)?;
    let issuer = CredentialIssuer::new(
        secrets.rtc_app_id.unwrap_or_default(),
        secrets.rtc_app_certificate.unwrap_or_default(),
    )
    .with_token_ttl(config.rtc.token_ttl_secs);

    let state = AppState::new(Arc::new(gateway), issuer);

    routes::start_server(port, state).await?;
    Ok(())
}

/// Terminal chat client: stdin lines become conversation turns.
async fn run_chat_client(
    server: &str,
    config: &MindEaseConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = Arc::new(ChatApiClient::new(server)?);

    let data_dir = resolve_data_dir(&config.general.data_dir);
    let store = Arc::new(JsonFileMoodStore::new(&data_dir));
    let session = ConversationSession::new(
        Arc::clone(&api) as Arc<dyn ChatCompletion>,
        Arc::new(NullSpeech),
        store,
    );

    let voice = VoiceSession::new(
        Arc::clone(&api) as Arc<dyn CredentialSource>,
        Arc::new(MockVoiceTransport::new()) as Arc<dyn VoiceTransport>,
    );
    let channel = config.rtc.default_channel.clone();

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!(
                "{}\n(commands: /join, /mute, /leave, /quit)\n",
                mindease_session::GREETING
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "/quit" => break,
            "/join" => match voice.join(&channel).await {
                Ok(()) => println!("joined voice room '{}'", channel),
                Err(e) => println!("could not join: {}", e),
            },
            "/mute" => match voice.toggle_mute() {
                Ok(muted) => println!("{}", if muted { "muted" } else { "unmuted" }),
                Err(e) => println!("could not toggle mute: {}", e),
            },
            "/leave" => match voice.leave().await {
                Ok(()) => println!("left voice room"),
                Err(e) => println!("could not leave: {}", e),
            },
            _ => match session.submit(input).await {
                SubmitOutcome::Completed { reply, mood_score } => {
                    println!("mindease> {}", reply);
                    println!("  [mood {:+}, feeling {}]", mood_score, theme_label(session.theme()));
                }
                SubmitOutcome::Failed => {
                    println!("mindease> {}", mindease_session::TURN_FAILED_REPLY);
                }
                SubmitOutcome::Ignored | SubmitOutcome::Superseded => {}
            },
        }
    }

    Ok(())
}

fn theme_label(theme: MoodTheme) -> &'static str {
    match theme {
        MoodTheme::Happy => "happy",
        MoodTheme::Sad => "sad",
        MoodTheme::Neutral => "neutral",
    }
}
