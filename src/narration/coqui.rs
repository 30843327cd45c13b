use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::SpeechConfig;
use crate::error::{Result, BlackboardError};
use crate::media::MediaCommandBuilder;
use super::SpeechSynthesizer;

/// Coqui TTS command-line synthesizer (XTTS v2 by default)
pub struct CoquiSynthesizer {
    config: SpeechConfig,
    command_builder: MediaCommandBuilder,
}

impl CoquiSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CoquiSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str, language: &str, out_path: &Path) -> Result<()> {
        info!("Synthesizing {} characters with voice '{}' -> {}",
              text.len(), voice, out_path.display());

        let command = self.command_builder.speech(
            &self.config.model,
            text,
            voice,
            language,
            out_path,
        );
        let output = command.execute().await?;
        debug!("tts output: {}", String::from_utf8_lossy(&output.stdout).trim());

        if !tokio::fs::try_exists(out_path).await? {
            return Err(BlackboardError::Media(format!(
                "Speech engine exited successfully but wrote no audio to {}",
                out_path.display()
            )));
        }

        Ok(())
    }
}
