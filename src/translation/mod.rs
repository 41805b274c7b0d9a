/*!
 * Markdown translation core.
 *
 * The work is split into several submodules:
 *
 * - `document`: Units, documents and run results
 * - `segmenter`: Splitting Markdown into translation units
 * - `glossary`: Persistent terminology table
 * - `gateway`: Model service operations with fallbacks
 * - `prompts`: Prompt templates
 * - `pipeline`: Per-unit translate, review and polish passes
 * - `concurrency`: Bounded worker pool for unit tasks
 */

// Re-export main types for easier usage
pub use self::concurrency::WorkerPool;
pub use self::document::{
    BatchReport, Document, ModelPass, ProgressContext, TermPair, TranslationResult, TranslationUnit, UnitStage,
};
pub use self::gateway::{Generation, ModelGateway, NO_REVIEW_SUGGESTIONS};
pub use self::glossary::GlossaryStore;
pub use self::pipeline::UnitPipeline;
pub use self::segmenter::segment;

// Submodules
pub mod concurrency;
pub mod document;
pub mod gateway;
pub mod glossary;
pub mod pipeline;
pub mod prompts;
pub mod segmenter;
