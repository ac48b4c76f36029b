use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MindEaseError, Result};

/// Top-level configuration for the MindEase application.
///
/// Loaded from `~/.mindease/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern. Secret material (API keys,
/// RTC credentials) is deliberately kept out of the file and read from the
/// environment instead — see [`Secrets`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindEaseConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub rtc: RtcConfig,
}

impl Default for MindEaseConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            completion: CompletionConfig::default(),
            rtc: RtcConfig::default(),
        }
    }
}

impl MindEaseConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MindEaseConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MindEaseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Listen port for the HTTP mediator.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Data directory for the persisted mood history.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            log_level: "info".to_string(),
            data_dir: "~/.mindease/data".to_string(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Chat-completions endpoint URL.
    pub api_base: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// System persona sent as the sole system turn of every request.
    pub persona: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            persona: "You are a kind, supportive mental health companion.".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Real-time communication (voice room) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtcConfig {
    /// Join-token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Channel joined by the bundled client when none is specified.
    pub default_channel: String,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 3600,
            default_channel: "mindease_room".to_string(),
        }
    }
}

/// Secret material read from the environment, never from the config file.
///
/// Every field is optional at startup: a missing key degrades to per-request
/// failures handled by the mediator fallback rules, never a crash.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Bearer key for the completion provider.
    pub completion_api_key: Option<String>,
    /// Application identity for the real-time transport.
    pub rtc_app_id: Option<String>,
    /// Application certificate used to sign join tokens.
    pub rtc_app_certificate: Option<String>,
}

impl Secrets {
    /// Read secrets from the process environment.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_env() -> Self {
        Self {
            completion_api_key: non_empty_var("OPENAI_API_KEY"),
            rtc_app_id: non_empty_var("AGORA_APP_ID"),
            rtc_app_certificate: non_empty_var("AGORA_APP_CERTIFICATE"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = MindEaseConfig::default();
        assert_eq!(config.general.port, 5000);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.data_dir, "~/.mindease/data");
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(
            config.completion.api_base,
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            config.completion.persona,
            "You are a kind, supportive mental health companion."
        );
        assert_eq!(config.completion.timeout_secs, 30);
        assert_eq!(config.rtc.token_ttl_secs, 3600);
        assert_eq!(config.rtc.default_channel, "mindease_room");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
port = 8080
log_level = "debug"
data_dir = "/custom/data"

[completion]
model = "gpt-4o"
timeout_secs = 10

[rtc]
token_ttl_secs = 600
default_channel = "quiet_room"
"#;
        let file = create_temp_config(content);
        let config = MindEaseConfig::load(file.path()).unwrap();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.completion.timeout_secs, 10);
        assert_eq!(config.rtc.token_ttl_secs, 600);
        assert_eq!(config.rtc.default_channel, "quiet_room");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = MindEaseConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.general.port, 5000);
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.rtc.token_ttl_secs, 3600);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MindEaseConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.port, 5000);
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let content = "this is {{ not valid TOML";
        let file = create_temp_config(content);
        assert!(MindEaseConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_invalid_toml_falls_back() {
        let content = "this is {{ not valid TOML";
        let file = create_temp_config(content);
        let config = MindEaseConfig::load_or_default(file.path());
        assert_eq!(config.general.port, 5000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = MindEaseConfig::default();
        config.general.port = 7000;
        config.save(&path).unwrap();

        let reloaded = MindEaseConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.port, 7000);
        assert_eq!(reloaded.completion.persona, config.completion.persona);
        assert_eq!(reloaded.rtc.token_ttl_secs, config.rtc.token_ttl_secs);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        MindEaseConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = MindEaseConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: MindEaseConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.general.port, config.general.port);
        assert_eq!(deserialized.completion.model, config.completion.model);
        assert_eq!(
            deserialized.rtc.default_channel,
            config.rtc.default_channel
        );
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = MindEaseConfig::load(file.path()).unwrap();
        assert_eq!(config.general.port, 5000);
        assert_eq!(config.completion.timeout_secs, 30);
        assert_eq!(config.rtc.default_channel, "mindease_room");
    }

    #[test]
    fn test_secrets_default_is_empty() {
        let secrets = Secrets::default();
        assert!(secrets.completion_api_key.is_none());
        assert!(secrets.rtc_app_id.is_none());
        assert!(secrets.rtc_app_certificate.is_none());
    }
}
