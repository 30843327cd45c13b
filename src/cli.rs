use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a narrated video from an authored response file
    Render {
        /// Response file with narration and scene sections
        #[arg(short, long)]
        response: PathBuf,

        /// Output name (defaults to the response file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Narrator voice (defaults to the configured voice)
        #[arg(long)]
        voice: Option<String>,

        /// Quality tier: low, medium, high or 4k
        #[arg(short, long, default_value = "high")]
        quality: String,
    },

    /// Render every response file in a directory
    Batch {
        /// Directory containing response files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Narrator voice (defaults to the configured voice)
        #[arg(long)]
        voice: Option<String>,

        /// Quality tier: low, medium, high or 4k
        #[arg(short, long, default_value = "high")]
        quality: String,
    },

    /// Synthesize narration audio only and print the clip timings
    Synthesize {
        /// Narration file, one sentence per line
        #[arg(short, long)]
        narration: PathBuf,

        /// Narrator voice (defaults to the configured voice)
        #[arg(long)]
        voice: Option<String>,
    },

    /// List rendered videos in the workspace
    List,

    /// List the available narrator voices
    Voices,

    /// Check that the speech, probe and render tools are installed
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "blackboard.toml")]
        output: PathBuf,
    },
}

impl Commands {
    /// Whether the command synthesizes or renders into the workspace
    pub fn uses_workspace(&self) -> bool {
        matches!(
            self,
            Commands::Render { .. } | Commands::Batch { .. } | Commands::Synthesize { .. }
        )
    }

    /// Voice explicitly requested on the command line
    pub fn voice(&self) -> Option<&str> {
        match self {
            Commands::Render { voice, .. }
            | Commands::Batch { voice, .. }
            | Commands::Synthesize { voice, .. } => voice.as_deref(),
            _ => None,
        }
    }
}
