use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::animation::{AnimationCompiler, RenderResult, RendererFactory, SceneRenderer, SceneTemplate, slugify};
use crate::config::Config;
use crate::error::{Result, BlackboardError};
use crate::narration::{
    AudioClip, DurationProber, NarrationRequest, NarrationServiceFactory, NarrationSynthesizer,
    SpeechImplementation, SpeechSynthesizer,
};
use crate::quality::QualityTier;
use crate::response::AuthoredResponse;

/// Outcome of a batch run over a directory of responses
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Responses that reached the renderer, successful or not
    pub rendered: Vec<(PathBuf, RenderResult)>,
    /// Responses that failed before rendering
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.rendered.iter().filter(|(_, result)| result.is_success()).count()
    }
}

/// Narration synthesis followed by animation compilation
pub struct Workflow {
    config: Config,
    narration: NarrationSynthesizer,
    compiler: AnimationCompiler,
}

impl Workflow {
    /// Build a workflow backed by the configured command-line tools
    pub fn new(config: Config) -> Result<Self> {
        let speech = NarrationServiceFactory::create_synthesizer(
            SpeechImplementation::Coqui,
            config.speech.clone(),
        );
        let prober = NarrationServiceFactory::create_prober(config.probe.clone());
        let renderer = RendererFactory::create_default(config.render.clone());

        Self::with_services(config, speech, prober, renderer)
    }

    /// Build a workflow around caller-supplied services
    pub fn with_services(
        config: Config,
        speech: Box<dyn SpeechSynthesizer>,
        prober: Box<dyn DurationProber>,
        renderer: Box<dyn SceneRenderer>,
    ) -> Result<Self> {
        let narration = NarrationSynthesizer::new(
            speech,
            prober,
            config.workspace.audio_dir(),
            config.speech.language.clone(),
        );
        let compiler = AnimationCompiler::new(renderer, &config.workspace.base_dir, &config.render)?;

        Ok(Self {
            config,
            narration,
            compiler,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compiler(&self) -> &AnimationCompiler {
        &self.compiler
    }

    /// Synthesize narration only
    pub async fn synthesize(&self, request: &NarrationRequest) -> Result<Vec<AudioClip>> {
        self.narration.synthesize(request).await
    }

    /// Compile an already-synthesized narration
    pub async fn compile(
        &self,
        template: &SceneTemplate,
        clips: &[AudioClip],
        name: &str,
        quality: QualityTier,
    ) -> Result<RenderResult> {
        self.compiler.compile(template, clips, name, quality).await
    }

    /// Run both stages for one request
    pub async fn generate(
        &self,
        request: &NarrationRequest,
        template: &SceneTemplate,
        name: &str,
        quality: QualityTier,
    ) -> Result<RenderResult> {
        crate::animation::validate_name(name)?;

        info!("Generating '{}': {} sentences at {} quality", name, request.len(), quality);
        let clips = self.narration.synthesize(request).await?;
        self.compiler.compile(template, &clips, name, quality).await
    }

    /// Generate a video from an authored response file.
    ///
    /// Without an explicit `name`, one is derived from the file stem.
    pub async fn process_response_file<P: AsRef<Path>>(
        &self,
        response_path: P,
        name: Option<&str>,
        voice: Option<&str>,
        quality: QualityTier,
    ) -> Result<RenderResult> {
        let response_path = response_path.as_ref();
        let response = AuthoredResponse::from_file(response_path).await?;

        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let stem = response_path
                    .file_stem()
                    .ok_or_else(|| BlackboardError::Config("Invalid response filename".to_string()))?
                    .to_string_lossy();
                slugify(&stem)
            }
        };
        let voice = voice.unwrap_or(self.config.speech.voice.as_str());

        let request = response.narration_request(voice)?;
        self.generate(&request, &response.scene_template(), &name, quality).await
    }

    /// Process every response file (`.txt` or `.md`) in a directory, one at a time.
    ///
    /// A failing file is logged and recorded; the remaining files still run.
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        voice: Option<&str>,
        quality: QualityTier,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(BlackboardError::Config("Input path is not a directory".to_string()));
        }

        let response_extensions = ["txt", "md"];
        let mut response_files: Vec<PathBuf> = WalkDir::new(input_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| response_extensions.contains(&ext.to_lowercase().as_str()))
            })
            .collect();
        response_files.sort();

        info!("Found {} response files to process", response_files.len());

        let progress = ProgressBar::new(response_files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut summary = BatchSummary::default();
        for response_path in response_files {
            progress.set_message(response_path.display().to_string());

            match self.process_response_file(&response_path, None, voice, quality).await {
                Ok(result) => {
                    match &result.error {
                        None => info!("Successfully rendered: {}", response_path.display()),
                        Some(e) => warn!("Render failed for {}: {}", response_path.display(), e),
                    }
                    summary.rendered.push((response_path, result));
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", response_path.display(), e);
                    summary.failed.push((response_path, e.to_string()));
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Batch finished: {} rendered, {} render failures, {} failed before rendering",
              summary.succeeded(),
              summary.rendered.len() - summary.succeeded(),
              summary.failed.len());
        Ok(summary)
    }
}
