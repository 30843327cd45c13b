use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{Result, BlackboardError};

// Default values for fields older config files may not carry
fn default_flush_poll_interval_ms() -> u64 {
    50
}

fn default_flush_timeout_ms() -> u64 {
    3000
}

fn default_base_dir() -> PathBuf {
    dirs::document_dir()
        .map(|documents| documents.join("Blackboard"))
        .unwrap_or_else(|| PathBuf::from("Blackboard"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root of the audio, working script and video layout
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Path to the Coqui `tts` binary
    pub binary_path: String,
    /// TTS model name
    pub model: String,
    /// Default speaker used when a request names none
    pub voice: String,
    /// Language code passed to the synthesizer
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Path to ffprobe binary
    pub binary_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Path to manim binary
    pub binary_path: String,
    /// Scene class the renderer is asked to render
    pub scene_name: String,
    /// Extension of the produced video file
    pub video_extension: String,
    /// First delay between checks for the rendered video
    #[serde(default = "default_flush_poll_interval_ms")]
    pub flush_poll_interval_ms: u64,
    /// Upper bound on waiting for the rendered video to appear
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
    /// Environment overrides applied to the renderer process only
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl WorkspaceConfig {
    pub fn audio_dir(&self) -> PathBuf {
        self.base_dir.join("media").join("audio")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.base_dir.join("media").join("videos")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join("log")
    }
}

impl RenderConfig {
    pub fn flush_poll_interval(&self) -> Duration {
        Duration::from_millis(self.flush_poll_interval_ms)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            binary_path: "tts".to_string(),
            model: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            voice: "Claribel Dervla".to_string(),
            language: "en".to_string(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffprobe".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let env = [
            ("PYTHONIOENCODING", "utf-8"),
            ("LC_ALL", "en_US.UTF-8"),
            ("LANG", "en_US.UTF-8"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        Self {
            binary_path: "manim".to_string(),
            scene_name: "NarratedScene".to_string(),
            video_extension: "mp4".to_string(),
            flush_poll_interval_ms: default_flush_poll_interval_ms(),
            flush_timeout_ms: default_flush_timeout_ms(),
            env,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BlackboardError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| BlackboardError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BlackboardError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| BlackboardError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Same configuration rooted at another workspace directory
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.workspace.base_dir = base_dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blackboard.toml");

        let mut config = Config::default().with_base_dir(dir.path());
        config.speech.voice = "Ana Florence".to_string();
        config.render.flush_timeout_ms = 1200;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.workspace.base_dir, dir.path());
        assert_eq!(loaded.speech.voice, "Ana Florence");
        assert_eq!(loaded.render.flush_timeout(), Duration::from_millis(1200));
        assert_eq!(loaded.render.env.get("PYTHONIOENCODING").map(String::as_str), Some("utf-8"));
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [render]
            binary_path = "/opt/manim/bin/manim"
            scene_name = "Intro"
            video_extension = "mov"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.binary_path, "/opt/manim/bin/manim");
        assert_eq!(config.render.flush_poll_interval_ms, 50);
        assert!(config.render.env.is_empty());
        assert_eq!(config.probe.binary_path, "ffprobe");
        assert_eq!(config.speech.language, "en");
    }

    #[test]
    fn test_workspace_layout() {
        let workspace = WorkspaceConfig {
            base_dir: PathBuf::from("/tmp/bb"),
        };
        assert_eq!(workspace.audio_dir(), PathBuf::from("/tmp/bb/media/audio"));
        assert_eq!(workspace.videos_dir(), PathBuf::from("/tmp/bb/media/videos"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, BlackboardError::Config(_)));
    }
}
