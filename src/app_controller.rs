use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::translation::{
    segment, BatchReport, Document, GlossaryStore, ModelGateway, ProgressContext, TranslationResult,
    TranslationUnit, UnitPipeline, WorkerPool,
};

// @module: Application controller for Markdown translation

/// What a run should do with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Grow the glossary from the input documents
    Extract,
    /// Translate the input documents into the output root
    Translate,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: Shared terminology table
    glossary: Arc<GlossaryStore>,

    // @field: Model service access
    gateway: Arc<ModelGateway>,

    // @field: Root that output paths are mirrored from
    input_root: PathBuf,

    // @field: Destination root, required for translation
    output_root: Option<PathBuf>,

    // @field: What is being worked on right now
    progress: Mutex<ProgressContext>,

    // @field: Draw progress bars on the terminal
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller from already built components
    pub fn new(
        glossary: Arc<GlossaryStore>,
        gateway: Arc<ModelGateway>,
        input_root: impl Into<PathBuf>,
        output_root: Option<PathBuf>,
    ) -> Self {
        Self {
            glossary,
            gateway,
            input_root: input_root.into(),
            output_root,
            progress: Mutex::new(ProgressContext::default()),
            show_progress: false,
        }
    }

    // @method: Create a controller talking to the configured model service
    pub fn with_config(
        config: &Config,
        glossary_path: &Path,
        input_root: impl Into<PathBuf>,
        output_root: Option<PathBuf>,
    ) -> Self {
        let glossary = Arc::new(GlossaryStore::load(glossary_path));
        let gateway = Arc::new(ModelGateway::from_config(&config.api));
        info!(
            "Using models {} (translate, review) and {} (polish) at {}",
            config.api.chat_model, config.api.reasoner_model, config.api.api_base
        );
        Self::new(glossary, gateway, input_root, output_root).with_progress(true)
    }

    /// Enable or disable terminal progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn glossary(&self) -> &GlossaryStore {
        &self.glossary
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    /// Snapshot of the current progress record
    pub fn progress(&self) -> ProgressContext {
        self.progress.lock().clone()
    }

    /// Dispatch a run on a file or directory
    pub async fn run(&self, input: &Path, mode: RunMode) -> Result<()> {
        let start_time = Instant::now();

        match mode {
            RunMode::Extract => {
                let added = self.extract_terminology(input).await?;
                info!(
                    "Terminology extraction finished: {} new terms, {} total, saved to {}",
                    added,
                    self.glossary.len(),
                    self.glossary.path().display()
                );
            }
            RunMode::Translate if FileManager::dir_exists(input) => {
                self.translate_directory().await?;
            }
            RunMode::Translate => {
                let result = self.translate_file(input).await;
                if let Some(message) = result.error_message {
                    error!("Translation of {} failed: {}", input.display(), message);
                }
            }
        }

        info!("Finished in {}", Self::format_duration(start_time.elapsed()));
        info!("{}", self.gateway.usage().summary());
        Ok(())
    }

    /// Translate one document into the output root
    ///
    /// Failures are reported in the result, never raised.
    pub async fn translate_file(&self, path: &Path) -> TranslationResult {
        let start_time = Instant::now();
        info!("Translating {}", path.display());
        self.progress.lock().start_file(path);

        let result = match self.translate_file_inner(path).await {
            Ok(output_path) => {
                info!(
                    "Translated {} -> {} in {}",
                    FileManager::display_name(path),
                    output_path.display(),
                    Self::format_duration(start_time.elapsed())
                );
                TranslationResult::succeeded(output_path)
            }
            Err(e) => {
                error!("Failed to translate {}: {}", path.display(), e);
                TranslationResult::failed(None, e)
            }
        };

        self.progress.lock().clear();
        result
    }

    async fn translate_file_inner(&self, path: &Path) -> Result<PathBuf, DocumentError> {
        let content = FileManager::read_document(path)?;
        let units = segment(&content);
        info!("Split {} into {} units", FileManager::display_name(path), units.len());
        self.progress.lock().set_total(units.len());

        let output_path = self.output_path_for(path)?;
        FileManager::write_to_file(&output_path, "")?;

        let document = Document::new(self.translate_units(units).await);
        let degraded = document.units.iter().filter(|unit| unit.degraded()).count();
        if degraded > 0 {
            warn!("{} of {} units fell back to untranslated or unpolished text", degraded, document.len());
        }

        FileManager::append_to_file(&output_path, &document.render())?;
        Ok(output_path)
    }

    async fn translate_units(&self, units: Vec<TranslationUnit>) -> Vec<TranslationUnit> {
        let pool = WorkerPool::default();
        let total = units.len();
        debug!("Translating {} units with {} workers", total, pool.workers());

        let progress_bar = self.progress_bar(total as u64, "units");
        progress_bar.set_message("Translating");

        let sources: Vec<String> = units.iter().map(|unit| unit.source_text().to_string()).collect();
        let pipeline = UnitPipeline::new(self.glossary.clone(), self.gateway.clone());
        let slots = pool
            .run_ordered(
                units,
                |_, unit| {
                    let pipeline = pipeline.clone();
                    async move { pipeline.process(unit).await }
                },
                |index, completed| {
                    self.progress.lock().set_index(index);
                    progress_bar.set_position(completed as u64);
                    debug!("Unit {} done ({}/{})", index + 1, completed, total);
                },
            )
            .await;

        progress_bar.finish_and_clear();

        slots
            .into_iter()
            .zip(sources)
            .enumerate()
            .map(|(index, (slot, source))| {
                slot.unwrap_or_else(|| {
                    warn!("Unit {} was lost, keeping its source text", index + 1);
                    TranslationUnit::untranslated(source)
                })
            })
            .collect()
    }

    /// Translate every Markdown file below the input root
    pub async fn translate_directory(&self) -> Result<BatchReport> {
        let start_time = Instant::now();
        let files = FileManager::find_markdown_files(&self.input_root)?;
        let mut report = BatchReport::default();

        if files.is_empty() {
            warn!("No Markdown files found in {}", self.input_root.display());
            return Ok(report);
        }
        info!("Found {} Markdown files in {}", files.len(), self.input_root.display());

        let folder_pb = self.progress_bar(files.len() as u64, "files");
        folder_pb.set_message("Processing files");

        for file in &files {
            folder_pb.set_message(format!("Processing: {}", FileManager::display_name(file)));

            let result = self.translate_file(file).await;
            if result.success {
                report.success_count += 1;
            } else {
                let message = result.error_message.unwrap_or_else(|| "unknown error".to_string());
                report.failed_files.push((file.clone(), message));
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} translated, {} failed in {}",
            report.success_count,
            report.failed_files.len(),
            Self::format_duration(start_time.elapsed())
        );
        for (file, message) in &report.failed_files {
            warn!("  {}: {}", file.display(), message);
        }

        Ok(report)
    }

    /// Grow the glossary from a file or every Markdown file in a directory
    ///
    /// The glossary is saved after every unit, so an interrupted run keeps
    /// what it found. Returns the number of new terms.
    pub async fn extract_terminology(&self, path: &Path) -> Result<usize> {
        let files = if FileManager::dir_exists(path) {
            FileManager::find_markdown_files(path)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut added = 0;
        for file in &files {
            info!("Extracting terminology from {}", file.display());
            self.progress.lock().start_file(file);

            let content = match FileManager::read_document(file) {
                Ok(content) => content,
                Err(e) => {
                    error!("Skipping {}: {}", file.display(), e);
                    continue;
                }
            };

            let units = segment(&content);
            self.progress.lock().set_total(units.len());
            let progress_bar = self.progress_bar(units.len() as u64, "units");
            progress_bar.set_message("Extracting terms");

            for (index, unit) in units.iter().enumerate() {
                self.progress.lock().set_index(index);
                if unit.is_code() {
                    debug!("Skipping code unit {}", index + 1);
                } else {
                    let new_terms = self.glossary.extract_and_merge(unit.source_text(), &self.gateway).await;
                    for term in &new_terms {
                        debug!("New term: {} -> {}", term.source, term.target);
                    }
                    added += new_terms.len();
                    self.glossary.save();
                }
                progress_bar.inc(1);
            }

            progress_bar.finish_and_clear();
        }

        self.progress.lock().clear();
        Ok(added)
    }

    /// Output location of an input document, parent directories created
    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf, DocumentError> {
        let output_root = self
            .output_root
            .as_ref()
            .ok_or_else(|| DocumentError::OutputPath("no output directory configured".to_string()))?;

        let output_path = FileManager::mirrored_output_path(input, &self.input_root, output_root);
        if let Some(parent) = output_path.parent() {
            FileManager::ensure_dir(parent).map_err(|source| DocumentError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(output_path)
    }

    fn progress_bar(&self, len: u64, unit_name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit_name
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
