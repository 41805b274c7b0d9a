/*!
 * Document model for Markdown translation.
 *
 * A document is an ordered list of translation units. Each unit carries its
 * verbatim source slice plus the outputs of every pipeline stage.
 */

use std::path::{Path, PathBuf};

/// Delimiter of a fenced code block
pub const FENCE_MARKER: &str = "```";

/// Separator written after every unit in the output file
pub const UNIT_SEPARATOR: &str = "\n\n";

/// A source term and its agreed translation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermPair {
    pub source: String,
    pub target: String,
}

impl TermPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Pipeline position of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitStage {
    #[default]
    Pending,
    Translated,
    Reviewed,
    Polished,
    Done,
}

/// Model call a unit made on its way through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPass {
    Translate,
    Review,
    Polish,
}

/// Atomic work item of the translation pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationUnit {
    source_text: String,

    /// Result of the initial translate call
    pub translation: String,

    /// Critique of `translation`, empty when the review was skipped
    pub review_notes: String,

    /// Final output for this unit
    pub polished_translation: String,

    /// Glossary entries relevant to the source text
    pub matched_terms: Vec<TermPair>,

    /// Current pipeline stage
    pub stage: UnitStage,

    /// Passes whose gateway call degraded to a fallback value
    pub fallbacks: Vec<ModelPass>,
}

impl TranslationUnit {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            ..Default::default()
        }
    }

    /// Finished unit carrying its own source text, used when its pipeline run was lost
    pub fn untranslated(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        Self {
            translation: source_text.clone(),
            polished_translation: source_text.clone(),
            stage: UnitStage::Done,
            fallbacks: vec![ModelPass::Translate],
            source_text,
            ..Default::default()
        }
    }

    /// Verbatim slice of the document, fixed at segmentation time
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Code units bypass translation entirely
    pub fn is_code(&self) -> bool {
        self.source_text.contains(FENCE_MARKER)
    }

    /// Text written to the output document for this unit
    pub fn output_text(&self) -> &str {
        if self.is_code() {
            &self.source_text
        } else {
            &self.polished_translation
        }
    }

    /// Whether any stage had to fall back to the best available text
    pub fn degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// Ordered sequence of translation units
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub units: Vec<TranslationUnit>,
}

impl Document {
    pub fn new(units: Vec<TranslationUnit>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Concatenate unit outputs in original order, each followed by a blank line
    pub fn render(&self) -> String {
        let mut output = String::new();
        for unit in &self.units {
            output.push_str(unit.output_text());
            output.push_str(UNIT_SEPARATOR);
        }
        output
    }
}

/// Transient record of what the orchestrator is working on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressContext {
    pub current_file: Option<PathBuf>,
    pub current_unit_index: Option<usize>,
    pub total_units: usize,
}

impl ProgressContext {
    pub fn start_file(&mut self, file: &Path) {
        self.current_file = Some(file.to_path_buf());
        self.current_unit_index = None;
        self.total_units = 0;
    }

    pub fn set_total(&mut self, total: usize) {
        self.total_units = total;
    }

    pub fn set_index(&mut self, index: usize) {
        self.current_unit_index = Some(index);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of translating one file
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl TranslationResult {
    pub fn succeeded(output_path: PathBuf) -> Self {
        Self {
            success: true,
            output_path: Some(output_path),
            error_message: None,
        }
    }

    pub fn failed(output_path: Option<PathBuf>, error: impl ToString) -> Self {
        Self {
            success: false,
            output_path,
            error_message: Some(error.to_string()),
        }
    }
}

/// Aggregate outcome of a directory run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub success_count: usize,
    pub failed_files: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_files.len()
    }
}
