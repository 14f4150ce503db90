use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Mentormate server.
///
/// Loaded from `~/.mentormate/config.toml` by default. Each section
/// corresponds to one outbound dependency or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MentormateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

impl MentormateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MentormateConfig = toml::from_str(&content)?;
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
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database and the dev API token.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Port the API server binds on (localhost only).
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.mentormate/data".to_string(),
            log_level: "info".to_string(),
            port: 5000,
        }
    }
}

/// Settings for the text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the completion API, up to (not including) the model name.
    pub api_url: String,
    /// Model identifier appended to the URL.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound on a single completion request.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Settings for the speech-synthesis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Full URL of the speech endpoint.
    pub api_url: String,
    /// Synthesis model identifier.
    pub model: String,
    /// Fixed voice identifier.
    pub voice: String,
    /// Requested compressed audio format.
    pub format: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound on a single synthesis request.
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/audio/speech".to_string(),
            model: "tts-1".to_string(),
            voice: "nova".to_string(),
            format: "mp3".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MentormateConfig::default();
        assert_eq!(config.general.port, 5000);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.generation.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.synthesis.voice, "nova");
        assert_eq!(config.synthesis.format, "mp3");
        assert_eq!(config.synthesis.timeout_secs, 30);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = MentormateConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: MentormateConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.general.port, config.general.port);
        assert_eq!(parsed.generation.api_url, config.generation.api_url);
        assert_eq!(parsed.synthesis.model, config.synthesis.model);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: MentormateConfig = toml::from_str(
            "[general]\nport = 8080\n\n[synthesis]\nvoice = \"alloy\"\n",
        )
        .unwrap();
        assert_eq!(config.general.port, 8080);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.synthesis.voice, "alloy");
        assert_eq!(config.synthesis.model, "tts-1");
        assert_eq!(config.generation.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MentormateConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.port, 5000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = MentormateConfig::default();
        config.general.port = 6001;
        config.generation.timeout_secs = 5;
        config.save(&path).unwrap();

        let loaded = MentormateConfig::load(&path).unwrap();
        assert_eq!(loaded.general.port, 6001);
        assert_eq!(loaded.generation.timeout_secs, 5);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [[[ valid").unwrap();

        assert!(MentormateConfig::load(&path).is_err());
        // load_or_default swallows the parse error
        let config = MentormateConfig::load_or_default(&path);
        assert_eq!(config.general.port, 5000);
    }
}
