//! Blackboard - Narrated Animation Pipeline
//!
//! This is the main entry point for the Blackboard application, which turns
//! authored narration and manim scene code into narrated videos using
//! Coqui TTS, ffprobe and manim.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blackboard::cli::{Args, Commands};
use blackboard::config::Config;
use blackboard::library::scan_creations;
use blackboard::narration::NarrationRequest;
use blackboard::quality::QualityTier;
use blackboard::setup::SetupManager;
use blackboard::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load blackboard.toml from current directory first
            if std::path::Path::new("blackboard.toml").exists() {
                Config::from_file("blackboard.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Only the pipeline commands create the workspace and its log file
    let uses_workspace = args.command.uses_workspace();
    let setup_manager = SetupManager::new(&config);
    if uses_workspace {
        setup_manager.initialize()?;
    }

    let _log_guard = setup_logging(&config, args.verbose, uses_workspace)?;
    info!("Starting Blackboard - Narrated Animation Pipeline");
    info!("Workspace: {}", setup_manager.base_dir().display());

    if uses_workspace {
        let voice = args.command.voice().unwrap_or(&config.speech.voice);
        setup_manager.ensure_voice(voice)?;
    }

    match args.command {
        Commands::Render { response, name, voice, quality } => {
            let quality: QualityTier = quality.parse()?;
            setup_manager.ensure_tools(&config).await?;

            let workflow = Workflow::new(config)?;
            let result = workflow
                .process_response_file(&response, name.as_deref(), voice.as_deref(), quality)
                .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if let Some(error) = result.error {
                anyhow::bail!("Render failed: {}", error.lines().last().unwrap_or("unknown error"));
            }
        }
        Commands::Batch { input_dir, voice, quality } => {
            let quality: QualityTier = quality.parse()?;
            setup_manager.ensure_tools(&config).await?;

            let workflow = Workflow::new(config)?;
            let summary = workflow
                .process_directory(&input_dir, voice.as_deref(), quality)
                .await?;

            println!("\nBatch Results:");
            println!("{:<10} {:<40} {:<60}", "Status", "Response", "Video / Error");
            println!("{}", "-".repeat(110));
            for (path, result) in &summary.rendered {
                let (status, detail) = match &result.error {
                    None => ("OK", result.path.display().to_string()),
                    Some(e) => ("RENDER", e.lines().last().unwrap_or_default().to_string()),
                };
                println!("{:<10} {:<40} {:<60}", status, file_label(path), detail);
            }
            for (path, error) in &summary.failed {
                println!("{:<10} {:<40} {:<60}", "FAILED", file_label(path), error);
            }
            println!("\n{} of {} responses rendered successfully",
                     summary.succeeded(), summary.rendered.len() + summary.failed.len());
        }
        Commands::Synthesize { narration, voice } => {
            setup_manager.ensure_tools(&config).await?;

            let text = tokio::fs::read_to_string(&narration).await?;
            let voice = voice.unwrap_or_else(|| config.speech.voice.clone());
            let request = NarrationRequest::from_narration(&text, voice)?;

            let workflow = Workflow::new(config)?;
            let clips = workflow.synthesize(&request).await?;
            println!("{}", serde_json::to_string_pretty(&clips)?);
        }
        Commands::List => {
            let creations = scan_creations(config.workspace.videos_dir()).await?;

            if creations.is_empty() {
                println!("No rendered videos found.");
            } else {
                println!("\nRendered Videos:");
                println!("{:<30} {:<10} {:<20} {:<60}", "Topic", "Quality", "Created", "Folder");
                println!("{}", "-".repeat(120));

                for creation in creations {
                    let quality = creation
                        .quality()
                        .map(|q| q.to_string())
                        .unwrap_or_else(|| creation.resolution.clone());
                    println!("{:<30} {:<10} {:<20} {:<60}",
                        creation.topic,
                        quality,
                        creation.created.format("%Y-%m-%d %H:%M"),
                        creation.path.display()
                    );
                }
            }
        }
        Commands::Voices => {
            println!("\nAvailable Voices:");
            for voice in setup_manager.get_available_voices() {
                let marker = if voice.name == config.speech.voice { "*" } else { " " };
                println!("{} {}", marker, voice.name);
            }
        }
        Commands::Check => {
            println!("\nExternal Tools:");
            println!("{:<10} {:<30} {:<60}", "Role", "Binary", "Status");
            println!("{}", "-".repeat(100));
            for status in setup_manager.check_tools(&config).await {
                let detail = match &status.version {
                    Ok(version) => version.clone(),
                    Err(e) => format!("MISSING: {}", e),
                };
                println!("{:<10} {:<30} {:<60}", status.role, status.binary_path, detail);
            }
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("Blackboard finished");
    Ok(())
}

/// Setup logging to the console, and to a daily log file when `to_file` is set
fn setup_logging(config: &Config, verbose: bool, to_file: bool) -> Result<Option<WorkerGuard>> {
    let log_dir = config.workspace.log_dir();

    // Set up file appender with daily rotation
    let (file_layer, guard) = if to_file {
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = rolling::daily(&log_dir, "blackboard.log");
        let (non_blocking_file, guard) = non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking_file)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false); // No ANSI colors in file
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so JSON results on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if to_file {
        info!("Logging initialized - console: {}, file: {}",
              log_level, log_dir.join("blackboard.log").display());
    }

    Ok(guard)
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
