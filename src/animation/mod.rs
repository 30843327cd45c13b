// Animation compilation
//
// Resolves duration placeholders in an authored scene script, hands the
// resolved script to an external renderer and reports where the video went.
// - Template: placeholder parsing and substitution
// - WorkingScript: the transient resolved script on disk
// - Manim: default renderer implementation
// - Compiler: the orchestration of the above

pub mod compiler;
pub mod manim;
pub mod template;
pub mod working_script;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use compiler::{AnimationCompiler, FlushPolicy, validate_name, slugify};
pub use template::SceneTemplate;
pub use working_script::WorkingScript;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::quality::QualityTier;

/// Batch scene renderer
#[async_trait]
pub trait SceneRenderer: Send + Sync {
    /// Render `scene_id` from the script at `script_path`.
    ///
    /// A render that ran and failed is an `Ok` outcome with a failing exit
    /// code; `Err` is reserved for a renderer that could not be started.
    async fn render(&self, script_path: &Path, quality: QualityTier, scene_id: &str) -> Result<RenderOutcome>;
}

/// Exit status and diagnostics of one renderer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub diagnostics: String,
}

impl RenderOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Where the video should be, and why it might not be there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl RenderResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Renderer implementation type
#[derive(Debug, Clone)]
pub enum RendererImplementation {
    Manim,
}

/// Factory for creating renderer instances
pub struct RendererFactory;

impl RendererFactory {
    pub fn create_renderer(
        implementation: RendererImplementation,
        config: RenderConfig,
    ) -> Box<dyn SceneRenderer> {
        match implementation {
            RendererImplementation::Manim => Box::new(manim::ManimRenderer::new(config)),
        }
    }

    pub fn create_default(config: RenderConfig) -> Box<dyn SceneRenderer> {
        Self::create_renderer(RendererImplementation::Manim, config)
    }
}
