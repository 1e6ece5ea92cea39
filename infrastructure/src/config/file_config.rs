//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

use relay_application::SessionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("idle_timeout_seconds cannot be 0")]
    InvalidIdleTimeout,

    #[error("max_anomalies must be at least 1")]
    InvalidMaxAnomalies,

    #[error("transcript_path cannot be empty")]
    EmptyTranscriptPath,
}

/// Raw session configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Seconds to wait for the next event before failing the session
    pub idle_timeout_seconds: Option<u64>,
    /// Anomalies retained in snapshots
    pub max_anomalies: Option<usize>,
    /// Emit snapshots for events that change nothing visible
    pub emit_unchanged: bool,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            idle_timeout_seconds: None,
            max_anomalies: defaults.max_anomalies,
            emit_unchanged: defaults.emit_unchanged,
        }
    }
}

/// Output format for snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    /// Rendered document for a terminal
    #[default]
    Text,
    /// One JSON snapshot per line
    Json,
    /// Server-Sent Events frames
    Sse,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: FileOutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: FileOutputFormat::Text,
            color: true,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Where to write the JSONL session transcript
    pub transcript_path: Option<String>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub session: FileSessionConfig,
    pub output: FileOutputConfig,
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.session.idle_timeout_seconds {
            return Err(ConfigValidationError::InvalidIdleTimeout);
        }

        if let Some(0) = self.session.max_anomalies {
            return Err(ConfigValidationError::InvalidMaxAnomalies);
        }

        if let Some(path) = &self.log.transcript_path
            && path.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyTranscriptPath);
        }

        Ok(())
    }

    /// Convert to the application-level session parameters.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_max_anomalies(self.session.max_anomalies)
            .with_emit_unchanged(self.session.emit_unchanged)
            .with_idle_timeout(self.session.idle_timeout_seconds.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[session]
idle_timeout_seconds = 120
max_anomalies = 50
emit_unchanged = true

[output]
format = "sse"
color = false

[log]
transcript_path = "/tmp/relay.transcript.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.idle_timeout_seconds, Some(120));
        assert_eq!(config.session.max_anomalies, Some(50));
        assert!(config.session.emit_unchanged);
        assert_eq!(config.output.format, FileOutputFormat::Sse);
        assert!(!config.output.color);
        assert_eq!(
            config.log.transcript_path.as_deref(),
            Some("/tmp/relay.transcript.jsonl")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FileConfig = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.output.format, FileOutputFormat::Json);
        assert!(config.output.color);
        assert_eq!(config.session.max_anomalies, Some(1000));
        assert!(config.log.transcript_path.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = FileConfig::default();
        config.session.idle_timeout_seconds = Some(0);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidIdleTimeout)
        );
    }

    #[test]
    fn test_validate_rejects_zero_anomaly_cap() {
        let mut config = FileConfig::default();
        config.session.max_anomalies = Some(0);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidMaxAnomalies)
        );
    }

    #[test]
    fn test_validate_rejects_blank_transcript_path() {
        let mut config = FileConfig::default();
        config.log.transcript_path = Some("  ".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyTranscriptPath)
        );
    }

    #[test]
    fn test_session_config_conversion() {
        let mut config = FileConfig::default();
        config.session.idle_timeout_seconds = Some(30);
        config.session.max_anomalies = None;
        let session = config.session_config();
        assert_eq!(session.idle_timeout, Some(Duration::from_secs(30)));
        assert!(session.max_anomalies.is_none());
        assert!(!session.emit_unchanged);
    }
}
