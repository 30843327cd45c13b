use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, BlackboardError};
use crate::quality::QualityTier;

/// Abstract external tool invocation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    pub current_dir: Option<PathBuf>,
    pub envs: BTreeMap<String, String>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            current_dir: None,
            envs: BTreeMap::new(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add a path argument
    pub fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Run the tool from the given directory
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set one environment variable for the child process
    pub fn env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Set several environment variables for the child process
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        cmd.envs(&self.envs);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run to completion and capture stdout/stderr whatever the exit status
    pub async fn output(&self) -> Result<Output> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        self.to_command().output().await.map_err(|e| {
            BlackboardError::ToolUnavailable(format!(
                "Failed to execute {} ({}): {}",
                self.binary_path, self.description, e
            ))
        })
    }

    /// Run to completion, treating a non-zero exit status as an error
    pub async fn execute(&self) -> Result<Output> {
        let output = self.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BlackboardError::Media(format!(
                "{} failed ({}): {}",
                self.description,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

/// Builder for the command lines of the external tools
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// Build a Coqui TTS synthesis command
    pub fn speech<P: AsRef<Path>>(
        &self,
        model: &str,
        text: &str,
        voice: &str,
        language: &str,
        out_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Speech synthesis")
            .arg("--model_name").arg(model)
            .arg("--text").arg(text)
            .arg("--speaker_idx").arg(voice)
            .arg("--language_idx").arg(language)
            .arg("--out_path").path_arg(out_path)
    }

    /// Build an ffprobe command printing only the container duration
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Duration probe")
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .path_arg(media_path)
    }

    /// Build a manim render command; runs from the script's directory
    pub fn render(&self, script_path: &Path, quality: QualityTier, scene_id: &str) -> MediaCommand {
        let script_arg = script_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| script_path.to_path_buf());

        let command = MediaCommand::new(&self.binary_path, "Scene render")
            .arg(format!("-q{}", quality.flag()))
            .path_arg(script_arg)
            .arg(scene_id);

        match script_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => command.current_dir(dir),
            None => command,
        }
    }

    /// Build version check command
    pub fn version_check(&self, flag: &str) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_command_line() {
        let cmd = MediaCommandBuilder::new("tts").speech(
            "tts_models/multilingual/multi-dataset/xtts_v2",
            "Hello there.",
            "Ana Florence",
            "en",
            "/tmp/media/audio/line_0.wav",
        );

        assert_eq!(cmd.binary_path, "tts");
        assert_eq!(
            cmd.args,
            vec![
                "--model_name", "tts_models/multilingual/multi-dataset/xtts_v2",
                "--text", "Hello there.",
                "--speaker_idx", "Ana Florence",
                "--language_idx", "en",
                "--out_path", "/tmp/media/audio/line_0.wav",
            ]
        );
    }

    #[test]
    fn test_probe_command_line() {
        let cmd = MediaCommandBuilder::new("ffprobe").probe_duration("clip.wav");
        assert_eq!(
            cmd.args,
            vec![
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
                "clip.wav",
            ]
        );
    }

    #[test]
    fn test_render_runs_from_script_directory() {
        let cmd = MediaCommandBuilder::new("manim")
            .render(Path::new("/work/pythagoras.py"), QualityTier::High, "NarratedScene")
            .env("PYTHONIOENCODING", "utf-8");

        assert_eq!(cmd.args, vec!["-qh", "pythagoras.py", "NarratedScene"]);
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/work")));
        assert_eq!(cmd.envs.get("PYTHONIOENCODING").map(String::as_str), Some("utf-8"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_reports_non_zero_exit() {
        let cmd = MediaCommand::new("sh", "Failing step").args(["-c", "echo broken >&2; exit 3"]);

        let output = cmd.output().await.unwrap();
        assert_eq!(output.status.code(), Some(3));

        let err = cmd.execute().await.unwrap_err();
        match err {
            BlackboardError::Media(message) => {
                assert!(message.contains("Failing step"));
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_unavailable() {
        let cmd = MediaCommand::new("blackboard-no-such-tool", "Missing tool");
        let err = cmd.output().await.unwrap_err();
        assert!(matches!(err, BlackboardError::ToolUnavailable(_)));
    }
}
