use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlackboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Speech synthesis failed for sentence {index}: {reason}")]
    Synthesis { index: usize, reason: String },

    #[error("Could not determine duration of clip {index}: {reason}")]
    Probe { index: usize, reason: String },

    #[error("Media command error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Response extraction error: {0}")]
    Extraction(String),

    #[error("Tool not available: {0}")]
    ToolUnavailable(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, BlackboardError>;
