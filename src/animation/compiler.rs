use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::error::{Result, BlackboardError};
use crate::narration::{AudioClip, ClipDurations};
use crate::quality::QualityTier;
use super::{RenderResult, SceneRenderer, SceneTemplate, WorkingScript};

const MAX_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long to wait for the renderer's video to show up on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl FlushPolicy {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            poll_interval: config.flush_poll_interval(),
            timeout: config.flush_timeout(),
        }
    }

    /// Do not wait at all
    pub fn none() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    /// Poll for `path` with doubling intervals until it exists or the timeout passes
    pub async fn wait_for(&self, path: &Path) -> bool {
        let deadline = Instant::now() + self.timeout;
        let mut interval = self.poll_interval.max(Duration::from_millis(1));

        loop {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(interval.min(deadline - now)).await;
            interval = (interval * 2).min(MAX_POLL_INTERVAL);
        }
    }
}

/// Turns a scene template and measured clips into a rendered video
pub struct AnimationCompiler {
    renderer: Box<dyn SceneRenderer>,
    base_dir: PathBuf,
    scene_name: String,
    video_extension: String,
    flush: FlushPolicy,
}

impl AnimationCompiler {
    /// `base_dir` is made absolute so reported video paths are too
    pub fn new<P: AsRef<Path>>(
        renderer: Box<dyn SceneRenderer>,
        base_dir: P,
        config: &RenderConfig,
    ) -> Result<Self> {
        Ok(Self {
            renderer,
            base_dir: std::path::absolute(base_dir.as_ref())?,
            scene_name: config.scene_name.clone(),
            video_extension: config.video_extension.clone(),
            flush: FlushPolicy::from_config(config),
        })
    }

    pub fn with_flush_policy(mut self, flush: FlushPolicy) -> Self {
        self.flush = flush;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Working script location for `name`
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.py", name))
    }

    /// Where the renderer puts the video for `name` at `quality`
    pub fn video_path(&self, name: &str, quality: QualityTier) -> PathBuf {
        self.base_dir
            .join("media")
            .join("videos")
            .join(name)
            .join(quality.resolution_label())
            .join(format!("{}.{}", self.scene_name, self.video_extension))
    }

    /// Substitute clip durations into `template`, render it and report the video path.
    ///
    /// Only invalid input and failure to write the working script are errors.
    /// A failed render comes back as `RenderResult::error`.
    pub async fn compile(
        &self,
        template: &SceneTemplate,
        clips: &[AudioClip],
        name: &str,
        quality: QualityTier,
    ) -> Result<RenderResult> {
        validate_name(name)?;

        let durations = ClipDurations::from_clips(clips);
        for index in template.placeholder_indices() {
            if !durations.contains(index) {
                warn!("Placeholder {} has no matching clip", SceneTemplate::placeholder(index));
            }
        }
        let resolved = template.resolve(&durations);

        let script = WorkingScript::create(self.script_path(name), &resolved).await?;
        info!("Compiling '{}' at {} ({} clips, {:.2}s of narration)",
              name, quality.resolution_label(), clips.len(), durations.total());

        let outcome = self.renderer
            .render(script.path(), quality, &self.scene_name)
            .await;
        script.release();

        let error = match outcome {
            Ok(outcome) if outcome.success() => None,
            Ok(outcome) => {
                let diagnostics = outcome.diagnostics.trim();
                Some(if diagnostics.is_empty() {
                    match outcome.exit_code {
                        Some(code) => format!("renderer exited with status {}", code),
                        None => "renderer was terminated by a signal".to_string(),
                    }
                } else {
                    diagnostics.to_string()
                })
            }
            Err(e) => Some(e.to_string()),
        };

        let path = self.video_path(name, quality);
        match &error {
            None => {
                if self.flush.wait_for(&path).await {
                    info!("Video ready at {}", path.display());
                } else {
                    warn!("Render succeeded but {} has not appeared yet", path.display());
                }
            }
            Some(message) => warn!("Render of '{}' failed: {}", name, message),
        }

        debug!("Render result for '{}': {}", name, path.display());
        Ok(RenderResult { path, error })
    }
}

/// Names become file and directory names: ASCII letters, digits, `_` and `-`,
/// not starting with `-`.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(BlackboardError::Config(format!(
            "Invalid scene name '{}': use ASCII letters, digits, '_' or '-'",
            name
        )))
    }
}

/// Turn a topic or file stem into a valid scene name
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    for c in topic.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_').chars().take(128).collect::<String>();
    if slug.is_empty() {
        "scene".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use crate::animation::RenderOutcome;

    /// Records each script it is given and answers with a fixed exit code
    struct ScriptedRenderer {
        exit_code: Option<i32>,
        diagnostics: &'static str,
        seen: Arc<Mutex<Vec<(PathBuf, String)>>>,
    }

    #[async_trait]
    impl SceneRenderer for ScriptedRenderer {
        async fn render(&self, script_path: &Path, _quality: QualityTier, _scene_id: &str) -> Result<RenderOutcome> {
            let contents = std::fs::read_to_string(script_path)?;
            self.seen.lock().unwrap().push((script_path.to_path_buf(), contents));
            Ok(RenderOutcome {
                exit_code: self.exit_code,
                diagnostics: self.diagnostics.to_string(),
            })
        }
    }

    struct UnstartableRenderer;

    #[async_trait]
    impl SceneRenderer for UnstartableRenderer {
        async fn render(&self, _: &Path, _: QualityTier, _: &str) -> Result<RenderOutcome> {
            Err(BlackboardError::ToolUnavailable("manim: not found".to_string()))
        }
    }

    fn compiler(
        base: &Path,
        exit_code: Option<i32>,
        diagnostics: &'static str,
    ) -> (AnimationCompiler, Arc<Mutex<Vec<(PathBuf, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let renderer = ScriptedRenderer { exit_code, diagnostics, seen: Arc::clone(&seen) };
        let compiler = AnimationCompiler::new(Box::new(renderer), base, &RenderConfig::default())
            .unwrap()
            .with_flush_policy(FlushPolicy::none());
        (compiler, seen)
    }

    fn clips() -> Vec<AudioClip> {
        vec![
            AudioClip::new(0, "media/audio/line_0.wav", 2.5),
            AudioClip::new(1, "media/audio/line_1.wav", 3.75),
        ]
    }

    #[tokio::test]
    async fn test_successful_render_substitutes_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, seen) = compiler(dir.path(), Some(0), "");

        let template = SceneTemplate::new("self.wait(#DURATION_0#)\nself.wait(#DURATION_1#)");
        let result = compiler
            .compile(&template, &clips(), "pythagoras", QualityTier::High)
            .await
            .unwrap();

        assert!(result.is_success());
        assert!(result.path.is_absolute());
        assert!(result.path.ends_with("media/videos/pythagoras/1080p60/NarratedScene.mp4"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, compiler.script_path("pythagoras"));
        assert_eq!(seen[0].1, "self.wait(2.5)\nself.wait(3.75)");
        assert!(!compiler.script_path("pythagoras").exists());
    }

    #[tokio::test]
    async fn test_failed_render_is_reported_as_data() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, _) = compiler(dir.path(), Some(1), "NameError: name 'Circel' is not defined\n");

        let result = compiler
            .compile(&SceneTemplate::new("Circel()"), &clips(), "typo", QualityTier::FourK)
            .await
            .unwrap();

        assert_eq!(result.error.as_deref(), Some("NameError: name 'Circel' is not defined"));
        assert!(result.path.to_string_lossy().contains("2160p60"));
        assert!(!compiler.script_path("typo").exists());
    }

    #[tokio::test]
    async fn test_silent_failure_still_has_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, _) = compiler(dir.path(), Some(2), "   ");

        let result = compiler
            .compile(&SceneTemplate::new(""), &[], "quiet", QualityTier::Low)
            .await
            .unwrap();

        assert_eq!(result.error.as_deref(), Some("renderer exited with status 2"));
    }

    #[tokio::test]
    async fn test_unstartable_renderer_degrades_to_result() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = AnimationCompiler::new(Box::new(UnstartableRenderer), dir.path(), &RenderConfig::default())
            .unwrap()
            .with_flush_policy(FlushPolicy::none());

        let result = compiler
            .compile(&SceneTemplate::new("x"), &clips(), "missing_tool", QualityTier::Medium)
            .await
            .unwrap();

        assert!(result.error.unwrap().contains("manim: not found"));
        assert!(result.path.to_string_lossy().contains("720p30"));
        assert!(!compiler.script_path("missing_tool").exists());
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, seen) = compiler(dir.path(), Some(0), "");

        for name in ["", "../escape", "has space", "-flag", "dot.py"] {
            let err = compiler
                .compile(&SceneTemplate::new("x"), &clips(), name, QualityTier::High)
                .await
                .unwrap_err();
            assert!(matches!(err, BlackboardError::Config(_)), "{name:?} should be rejected");
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_name_twice_uses_fresh_script() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, seen) = compiler(dir.path(), Some(0), "");

        compiler
            .compile(&SceneTemplate::new("first #DURATION_0#"), &clips(), "topic", QualityTier::High)
            .await
            .unwrap();
        compiler
            .compile(&SceneTemplate::new("second"), &clips(), "topic", QualityTier::High)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, "first 2.5");
        assert_eq!(seen[1].1, "second");
        assert!(!compiler.script_path("topic").exists());
    }

    #[tokio::test]
    async fn test_flush_policy_finds_late_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.mp4");

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            tokio::fs::write(writer_path, b"video").await.unwrap();
        });

        let policy = FlushPolicy {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_secs(2),
        };
        assert!(policy.wait_for(&path).await);
        writer.await.unwrap();

        assert!(!FlushPolicy::none().wait_for(&dir.path().join("never.mp4")).await);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("pythagorean_theorem").is_ok());
        assert!(validate_name("Topic-2").is_ok());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("naïve").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Pythagorean Theorem!"), "the_pythagorean_theorem");
        assert_eq!(slugify("  --  "), "scene");
        assert!(validate_name(&slugify("Fourier series: an intro")).is_ok());
    }
}
