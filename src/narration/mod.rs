// Narration synthesis
//
// Turns an ordered list of sentences into timed audio clips. The two external
// services involved are abstracted behind traits so the synthesizer can be
// driven by fakes in tests:
// - SpeechSynthesizer: text -> audio file (Coqui TTS by default)
// - DurationProber: audio file -> seconds (ffprobe by default)
//
// To add another speech engine, implement SpeechSynthesizer for it, add a
// variant to SpeechImplementation and extend NarrationServiceFactory.

pub mod coqui;
pub mod ffprobe;
pub mod synthesizer;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use synthesizer::NarrationSynthesizer;

use crate::config::{ProbeConfig, SpeechConfig};
use crate::error::{Result, BlackboardError};

/// Text-to-speech service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with `voice` and write the audio to `out_path`.
    /// Returns once the file exists on disk or the engine has failed.
    async fn synthesize(&self, text: &str, voice: &str, language: &str, out_path: &Path) -> Result<()>;
}

/// Media inspection service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Duration of the media file in seconds
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;
}

/// Ordered sentences plus the voice that should speak them
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationRequest {
    sentences: Vec<String>,
    voice: String,
}

impl NarrationRequest {
    /// Sentences must be non-empty and none may be blank.
    pub fn new<I, S, V>(sentences: I, voice: V) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        V: Into<String>,
    {
        let sentences: Vec<String> = sentences.into_iter().map(Into::into).collect();
        let voice = voice.into();

        if sentences.is_empty() {
            return Err(BlackboardError::Config(
                "Narration needs at least one sentence".to_string(),
            ));
        }
        if let Some(index) = sentences.iter().position(|s| s.trim().is_empty()) {
            return Err(BlackboardError::Config(format!(
                "Sentence {} is blank",
                index
            )));
        }
        if voice.trim().is_empty() {
            return Err(BlackboardError::Config("Voice must not be empty".to_string()));
        }

        Ok(Self { sentences, voice })
    }

    /// One sentence per non-blank line, trimmed
    pub fn from_narration<V: Into<String>>(narration: &str, voice: V) -> Result<Self> {
        let sentences = narration
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());
        Self::new(sentences, voice)
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// One synthesized sentence and its measured length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioClip {
    index: usize,
    path: PathBuf,
    duration: f64,
}

impl AudioClip {
    pub fn new<P: Into<PathBuf>>(index: usize, path: P, duration: f64) -> Self {
        Self {
            index,
            path: path.into(),
            duration,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// Clip index -> duration, the handshake between narration and animation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipDurations(BTreeMap<usize, f64>);

impl ClipDurations {
    pub fn from_clips(clips: &[AudioClip]) -> Self {
        Self(clips.iter().map(|clip| (clip.index, clip.duration)).collect())
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// Total narration length in seconds
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(usize, f64)> for ClipDurations {
    fn from_iter<T: IntoIterator<Item = (usize, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Speech engine implementation type
#[derive(Debug, Clone)]
pub enum SpeechImplementation {
    Coqui,
}

/// Factory for the default narration services
pub struct NarrationServiceFactory;

impl NarrationServiceFactory {
    pub fn create_synthesizer(
        implementation: SpeechImplementation,
        config: SpeechConfig,
    ) -> Box<dyn SpeechSynthesizer> {
        match implementation {
            SpeechImplementation::Coqui => Box::new(coqui::CoquiSynthesizer::new(config)),
        }
    }

    pub fn create_prober(config: ProbeConfig) -> Box<dyn DurationProber> {
        Box::new(ffprobe::FfprobeProber::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_narration_drops_blank_lines() {
        let request = NarrationRequest::from_narration(
            "  First sentence.\n\n   \nSecond sentence.  \n",
            "Claribel Dervla",
        )
        .unwrap();

        assert_eq!(request.sentences(), ["First sentence.", "Second sentence."]);
        assert_eq!(request.voice(), "Claribel Dervla");
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let err = NarrationRequest::new(Vec::<String>::new(), "Ana Florence").unwrap_err();
        assert!(matches!(err, BlackboardError::Config(_)));

        let err = NarrationRequest::from_narration("\n \n", "Ana Florence").unwrap_err();
        assert!(matches!(err, BlackboardError::Config(_)));
    }

    #[test]
    fn test_blank_sentence_is_rejected() {
        let err = NarrationRequest::new(["One.", "  ", "Three."], "Ana Florence").unwrap_err();
        match err {
            BlackboardError::Config(message) => assert!(message.contains('1')),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clip_durations_map_by_index() {
        let clips = vec![
            AudioClip::new(0, "line_0.wav", 2.5),
            AudioClip::new(1, "line_1.wav", 3.75),
        ];
        let durations = ClipDurations::from_clips(&clips);

        assert_eq!(durations.get(0), Some(2.5));
        assert_eq!(durations.get(1), Some(3.75));
        assert_eq!(durations.get(2), None);
        assert_eq!(durations.indices().collect::<Vec<_>>(), vec![0, 1]);
        assert!((durations.total() - 6.25).abs() < f64::EPSILON);
    }
}
