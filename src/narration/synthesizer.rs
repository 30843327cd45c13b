use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{Result, BlackboardError};
use super::{AudioClip, DurationProber, NarrationRequest, SpeechSynthesizer};

/// Speaks each sentence of a request in order and measures the result.
///
/// Clips land at `<audio_dir>/line_<i>.wav`. The directory is shared between
/// runs and is not locked, so two synthesizers must not target it at once.
pub struct NarrationSynthesizer {
    speech: Box<dyn SpeechSynthesizer>,
    prober: Box<dyn DurationProber>,
    audio_dir: PathBuf,
    language: String,
}

impl NarrationSynthesizer {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        speech: Box<dyn SpeechSynthesizer>,
        prober: Box<dyn DurationProber>,
        audio_dir: P,
        language: S,
    ) -> Self {
        Self {
            speech,
            prober,
            audio_dir: audio_dir.into(),
            language: language.into(),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Where sentence `index` is written
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.audio_dir.join(format!("line_{}.wav", index))
    }

    /// Synthesize and time every sentence.
    ///
    /// The first failure aborts the run; clips already written stay on disk.
    pub async fn synthesize(&self, request: &NarrationRequest) -> Result<Vec<AudioClip>> {
        info!("Synthesizing {} sentences with voice '{}'", request.len(), request.voice());

        fs::create_dir_all(&self.audio_dir).await?;

        let mut clips = Vec::with_capacity(request.len());
        for (index, sentence) in request.sentences().iter().enumerate() {
            let clip_path = self.clip_path(index);

            self.speech
                .synthesize(sentence.trim(), request.voice(), &self.language, &clip_path)
                .await
                .map_err(|e| {
                    warn!("Speech synthesis failed at sentence {}: {}", index, e);
                    BlackboardError::Synthesis { index, reason: e.to_string() }
                })?;

            let duration = self.prober
                .probe_duration(&clip_path)
                .await
                .map_err(|e| BlackboardError::Probe { index, reason: e.to_string() })?;

            if !duration.is_finite() || duration <= 0.0 {
                return Err(BlackboardError::Probe {
                    index,
                    reason: format!("duration {} is not a positive number of seconds", duration),
                });
            }

            info!("Clip {} ready: {:.2}s at {}", index, duration, clip_path.display());
            clips.push(AudioClip::new(index, clip_path, duration));
        }

        Ok(clips)
    }
}
