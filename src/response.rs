use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::info;

use crate::animation::SceneTemplate;
use crate::error::{Result, BlackboardError};
use crate::narration::NarrationRequest;

// Both `---NARRATION---` and the shorter `-NARRATION-` markers are in use
static NARRATION_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)-+NARRATION-+[ \t]*\r?\n(.*?)\r?\n[ \t]*\r?\n-+MANIM-+")
        .expect("narration pattern is valid")
});

static SCENE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)-+MANIM-+[ \t]*\r?\n(.*)").expect("scene pattern is valid")
});

/// Narration and scene code split out of an authored response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredResponse {
    pub narration: String,
    pub scene_code: String,
}

impl AuthoredResponse {
    /// Split a response into its narration and scene sections
    pub fn parse(response: &str) -> Result<Self> {
        let narration = NARRATION_SECTION
            .captures(response)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| {
                BlackboardError::Extraction("Could not find narration section in response".to_string())
            })?;

        let scene_code = SCENE_SECTION
            .captures(response)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| {
                BlackboardError::Extraction("Could not find scene code section in response".to_string())
            })?;

        if scene_code.is_empty() {
            return Err(BlackboardError::Extraction("Scene code section is empty".to_string()));
        }

        Ok(Self { narration, scene_code })
    }

    /// Read and parse a response saved to disk
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BlackboardError::FileNotFound(path.display().to_string()));
        }
        info!("Reading authored response: {}", path.display());
        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn narration_request<V: Into<String>>(&self, voice: V) -> Result<NarrationRequest> {
        NarrationRequest::from_narration(&self.narration, voice)
    }

    pub fn scene_template(&self) -> SceneTemplate {
        SceneTemplate::new(self.scene_code.clone())
    }
}
