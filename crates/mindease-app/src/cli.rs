//! CLI argument definitions for the MindEase application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// MindEase — a chat-and-voice wellness companion server and client.
#[derive(Parser, Debug)]
#[command(name = "mindease", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Run the terminal chat client instead of the server.
    #[arg(long = "chat")]
    pub chat: bool,

    /// Server base URL for the chat client.
    #[arg(long = "server")]
    pub server: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MINDEASE_CONFIG env var > ~/.mindease/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MINDEASE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > MINDEASE_PORT env var > PORT env var >
    /// config file value > 5000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        for var in ["MINDEASE_PORT", "PORT"] {
            if let Ok(val) = std::env::var(var) {
                if let Ok(p) = val.parse::<u16>() {
                    return p;
                }
            }
        }
        if config_port != 0 {
            return config_port;
        }
        5000
    }

    /// Resolve the server URL the chat client talks to.
    pub fn resolve_server(&self, port: u16) -> String {
        self.server
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", port))
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".mindease").join("config.toml");
    }
    PathBuf::from("config.toml")
}
