/*!
 * # mdtranslate - English to Chinese Markdown translation with LLMs
 *
 * A Rust library for translating long-form technical Markdown documents
 * with a large language model while keeping terminology consistent.
 *
 * ## Features
 *
 * - Segment Markdown into bounded units, never splitting fenced code
 * - Translate, review and polish every prose unit through the model service
 * - Keep a persistent English to Chinese glossary, grown by term extraction
 * - Process units concurrently and reassemble them in document order
 * - Degrade gracefully: a failed model call never loses text
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation core:
 *   - `translation::segmenter`: Markdown segmentation
 *   - `translation::glossary`: Terminology store
 *   - `translation::gateway`: Model service operations with fallbacks
 *   - `translation::pipeline`: Per-unit translate, review and polish
 *   - `translation::concurrency`: Bounded worker pool
 * - `file_utils`: File system operations
 * - `app_controller`: Document and directory orchestration
 * - `providers`: Model service clients:
 *   - `providers::openai`: OpenAI-compatible chat completions client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunMode};
pub use errors::{DocumentError, GlossaryError, ProviderError};
pub use translation::{GlossaryStore, ModelGateway, TranslationUnit};
