use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BabelsyncError, Result};

/// Environment variable overriding the translation service API key.
pub const ENV_TRANSCRIPTION_API_KEY: &str = "BABELSYNC_TRANSCRIPTION_API_KEY";
/// Environment variable overriding the sync service API key.
pub const ENV_SYNC_API_KEY: &str = "BABELSYNC_SYNC_API_KEY";

/// Config file looked up in the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "babelsync.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    pub sync: SyncConfig,
    pub poll: PollConfig,
    pub results: ResultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Base URL of the transcription/translation service
    pub endpoint: String,
    /// API key for the transcription/translation service
    pub api_key: String,
    /// Model used for speech transcription
    pub transcription_model: String,
    /// Model used for transcript translation
    pub translation_model: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the voice-clone/lip-sync service
    pub endpoint: String,
    /// API key for the voice-clone/lip-sync service
    pub api_key: String,
    /// Lip-sync model used for rendering
    pub lipsync_model: String,
    /// TTS model used to synthesize the translated speech
    pub tts_model: String,
    /// Voice to clone; the service default voice when omitted
    pub voice_id: Option<String>,
    /// How generated audio is fitted to the video duration
    pub sync_mode: SyncMode,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Strategy the sync service applies when the generated audio and the video
/// differ in duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Loop,
    Bounce,
    CutOff,
    Silence,
    Remap,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Bounce => "bounce",
            Self::CutOff => "cut_off",
            Self::Silence => "silence",
            Self::Remap => "remap",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "loop" => Ok(Self::Loop),
            "bounce" => Ok(Self::Bounce),
            "cut_off" => Ok(Self::CutOff),
            "silence" => Ok(Self::Silence),
            "remap" => Ok(Self::Remap),
            other => Err(BabelsyncError::Config(format!(
                "Invalid sync mode '{}'. Valid modes: loop, bounce, cut_off, silence, remap",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to wait between job status queries
    pub interval_secs: u64,
    /// Maximum number of status queries before the run is declared timed out
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Path of the JSON file completed runs are recorded in
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate: TranslateConfig {
                endpoint: "https://api.openai.com".to_string(),
                api_key: String::new(),
                transcription_model: "whisper-1".to_string(),
                translation_model: "gpt-3.5-turbo".to_string(),
                request_timeout_secs: 300,
            },
            sync: SyncConfig {
                endpoint: "https://api.sync.so".to_string(),
                api_key: String::new(),
                lipsync_model: "lipsync-2".to_string(),
                tts_model: "eleven_multilingual_v2".to_string(),
                voice_id: None,
                sync_mode: SyncMode::Bounce,
                request_timeout_secs: 120,
            },
            poll: PollConfig {
                interval_secs: 10,
                max_attempts: 90,
            },
            results: ResultsConfig {
                path: PathBuf::from("babelsync_results.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BabelsyncError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| BabelsyncError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BabelsyncError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| BabelsyncError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration: explicit path if given, `babelsync.toml` in the
    /// current directory if present, built-in defaults otherwise. API keys
    /// from the environment take precedence over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    Self::from_file(DEFAULT_CONFIG_FILE)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Pick up API keys from the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_TRANSCRIPTION_API_KEY) {
            if !key.is_empty() {
                self.translate.api_key = key;
            }
        }
        if let Ok(key) = std::env::var(ENV_SYNC_API_KEY) {
            if !key.is_empty() {
                self.sync.api_key = key;
            }
        }
    }

    /// Verify that both credentials are present. Called before any network
    /// activity so missing keys fail fast.
    pub fn validate_credentials(&self) -> Result<()> {
        self.translate.validate_api_key()?;
        self.sync.validate_api_key()
    }
}

impl TranslateConfig {
    /// Verify the translation service credential is present.
    pub fn validate_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(BabelsyncError::Config(format!(
                "Translation API key is not set. Add translate.api_key to the config file or set {}",
                ENV_TRANSCRIPTION_API_KEY
            )));
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Verify the sync service credential is present.
    pub fn validate_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(BabelsyncError::Config(format!(
                "Sync API key is not set. Add sync.api_key to the config file or set {}",
                ENV_SYNC_API_KEY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_poll_budget() {
        let config = Config::default();
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.poll.max_attempts, 90);
        assert_eq!(config.sync.sync_mode, SyncMode::Bounce);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let toml_text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.translate.transcription_model, "whisper-1");
        assert_eq!(parsed.sync.lipsync_model, "lipsync-2");
        assert_eq!(parsed.results.path, PathBuf::from("babelsync_results.json"));
    }

    #[test]
    fn test_sync_mode_parse() {
        assert_eq!(SyncMode::parse("bounce").unwrap(), SyncMode::Bounce);
        assert_eq!(SyncMode::parse("CUT_OFF").unwrap(), SyncMode::CutOff);
        assert!(SyncMode::parse("stretch").is_err());
    }

    #[test]
    fn test_validate_credentials_requires_both_keys() {
        let mut config = Config::default();
        assert!(config.validate_credentials().is_err());

        config.translate.api_key = "tk-123".to_string();
        assert!(config.validate_credentials().is_err());

        config.sync.api_key = "sk-456".to_string();
        assert!(config.validate_credentials().is_ok());
    }

    #[test]
    fn test_section_api_key_checks_name_their_env_var() {
        let config = Config::default();

        let err = config.sync.validate_api_key().unwrap_err();
        assert!(err.to_string().contains(ENV_SYNC_API_KEY));

        let err = config.translate.validate_api_key().unwrap_err();
        assert!(err.to_string().contains(ENV_TRANSCRIPTION_API_KEY));
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let mut config = Config::default();
        config.translate.api_key = "file-key".to_string();

        unsafe {
            std::env::set_var(ENV_TRANSCRIPTION_API_KEY, "env-key");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var(ENV_TRANSCRIPTION_API_KEY);
        }

        assert_eq!(config.translate.api_key, "env-key");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("babelsync.toml");

        let mut config = Config::default();
        config.sync.voice_id = Some("21m00Tcm4TlvDq8ikWAM".to_string());
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(
            reloaded.sync.voice_id.as_deref(),
            Some("21m00Tcm4TlvDq8ikWAM")
        );
    }
}
