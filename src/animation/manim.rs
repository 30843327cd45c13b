use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::error::Result;
use crate::media::MediaCommandBuilder;
use crate::quality::QualityTier;
use super::{RenderOutcome, SceneRenderer};

/// Renders scenes with the `manim` command-line tool
pub struct ManimRenderer {
    config: RenderConfig,
    command_builder: MediaCommandBuilder,
}

impl ManimRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl SceneRenderer for ManimRenderer {
    async fn render(&self, script_path: &Path, quality: QualityTier, scene_id: &str) -> Result<RenderOutcome> {
        info!("Rendering {} from {} at {} quality", scene_id, script_path.display(), quality);

        let command = self.command_builder
            .render(script_path, quality, scene_id)
            .envs(self.config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let output = command.output().await?;
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!("manim stdout: {}", String::from_utf8_lossy(&output.stdout).trim());

        if output.status.success() {
            info!("Render of {} completed", scene_id);
        } else {
            warn!("Render of {} exited with {}", scene_id, output.status);
        }

        Ok(RenderOutcome {
            exit_code: output.status.code(),
            diagnostics,
        })
    }
}
