use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::{Result, BlackboardError};
use crate::media::MediaCommandBuilder;
use super::DurationProber;

/// Duration prober backed by `ffprobe`
pub struct FfprobeProber {
    command_builder: MediaCommandBuilder,
}

impl FfprobeProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            command_builder: MediaCommandBuilder::new(config.binary_path),
        }
    }
}

#[async_trait]
impl DurationProber for FfprobeProber {
    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        let output = self.command_builder
            .probe_duration(media_path)
            .execute()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout)?;
        debug!("{} lasts {}s", media_path.display(), duration);
        Ok(duration)
    }
}

/// Parse ffprobe's bare `format=duration` output
pub fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BlackboardError::Media("ffprobe printed no duration".to_string()));
    }

    trimmed.parse::<f64>().map_err(|_| {
        BlackboardError::Media(format!("ffprobe printed a non-numeric duration: '{}'", trimmed))
    })
}
