use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, BlackboardError};
use crate::media::check_tool;

/// Prepares the workspace layout and inspects the external tools
pub struct SetupManager {
    base_dir: PathBuf,
    audio_dir: PathBuf,
    log_dir: PathBuf,
}

/// A speaker of the XTTS v2 model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
}

/// Result of probing one external tool
#[derive(Debug)]
pub struct ToolStatus {
    pub role: &'static str,
    pub binary_path: String,
    pub version: Result<String>,
}

impl ToolStatus {
    pub fn is_available(&self) -> bool {
        self.version.is_ok()
    }
}

const XTTS_VOICES: &[&str] = &[
    "Claribel Dervla", "Daisy Studious", "Gracie Wise", "Tammie Ema", "Alison Dietlinde",
    "Ana Florence", "Annmarie Nele", "Asya Anara", "Brenda Stern", "Gitta Nikolina",
    "Henriette Usha", "Sofia Hellen", "Tammy Grit", "Tanja Adelina", "Vjollca Johnnie",
    "Andrew Chipper", "Badr Odhiambo", "Dionisio Schuyler", "Royston Min", "Viktor Eka",
    "Abrahan Mack", "Adde Michal", "Baldur Sanjin", "Craig Gutsy", "Damien Black",
    "Gilberto Mathias", "Ilkin Urbano", "Kazuhiko Atallah", "Ludvig Milivoj", "Suad Qasim",
    "Torcull Diarmuid", "Viktor Menelaos", "Zacharie Aimilios", "Nova Hogarth", "Maja Ruoho",
    "Uta Obando", "Lidiya Szekeres", "Chandra MacFarland", "Szofi Granger", "Camilla Holmström",
    "Lilya Stainthorpe", "Zofija Kendrick", "Narelle Moon", "Barbora MacLean", "Alexandra Hisakawa",
    "Alma María", "Rosemary Okafor", "Ige Behringer", "Filip Traverse", "Damjan Chapman",
    "Wulf Carlevaro", "Aaron Dreschner", "Kumar Dahl", "Eugenio Mataracı", "Ferran Simen",
    "Xavier Hayasaka", "Luis Moray", "Marcos Rudaski",
];

impl SetupManager {
    pub fn new(config: &Config) -> Self {
        Self {
            base_dir: config.workspace.base_dir.clone(),
            audio_dir: config.workspace.audio_dir(),
            log_dir: config.workspace.log_dir(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the workspace directories if they do not exist yet
    pub fn initialize(&self) -> Result<()> {
        info!("Preparing workspace at {}", self.base_dir.display());
        fs::create_dir_all(&self.audio_dir)?;
        fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Probe the speech, probe and render tools
    pub async fn check_tools(&self, config: &Config) -> Vec<ToolStatus> {
        let tools = [
            ("speech", config.speech.binary_path.as_str(), "--help"),
            ("probe", config.probe.binary_path.as_str(), "-version"),
            ("render", config.render.binary_path.as_str(), "--version"),
        ];

        let mut statuses = Vec::with_capacity(tools.len());
        for (role, binary_path, flag) in tools {
            let version = check_tool(binary_path, flag).await;
            if let Err(e) = &version {
                warn!("{} tool '{}' is not usable: {}", role, binary_path, e);
            }
            statuses.push(ToolStatus {
                role,
                binary_path: binary_path.to_string(),
                version,
            });
        }
        statuses
    }

    /// Fail with the first unusable tool
    pub async fn ensure_tools(&self, config: &Config) -> Result<()> {
        for status in self.check_tools(config).await {
            if let Err(e) = status.version {
                return Err(BlackboardError::ToolUnavailable(format!(
                    "{} ({}): {}",
                    status.role, status.binary_path, e
                )));
            }
        }
        Ok(())
    }

    pub fn get_available_voices(&self) -> Vec<VoiceInfo> {
        XTTS_VOICES
            .iter()
            .map(|name| VoiceInfo { name: name.to_string() })
            .collect()
    }

    pub fn is_known_voice(&self, voice: &str) -> bool {
        XTTS_VOICES.contains(&voice)
    }

    /// Reject voices the speech model does not ship before any audio is synthesized
    pub fn ensure_voice(&self, voice: &str) -> Result<()> {
        if self.is_known_voice(voice) {
            return Ok(());
        }
        Err(BlackboardError::Config(format!(
            "Unknown voice '{}'; run `blackboard voices` to list the available speakers",
            voice
        )))
    }
}
