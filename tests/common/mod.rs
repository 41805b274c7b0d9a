/*!
 * Common test utilities for the mdtranslate test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use mdtranslate::app_config::ApiConfig;
use mdtranslate::errors::ProviderError;
use mdtranslate::providers::mock::MockProvider;
use mdtranslate::providers::{GenerationRequest, RequestPurpose};
use mdtranslate::{Controller, GlossaryStore, ModelGateway};

/// Route log output through the test harness
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Mock answering every purpose with a fixed text
pub fn scripted_provider(translate: &str, review: &str, polish: &str) -> MockProvider {
    let (translate, review, polish) = (translate.to_string(), review.to_string(), polish.to_string());
    MockProvider::with_responder(move |req: &GenerationRequest| match req.purpose {
        RequestPurpose::Translate => Ok(translate.clone()),
        RequestPurpose::Review => Ok(review.clone()),
        RequestPurpose::Polish => Ok(polish.clone()),
        RequestPurpose::ExtractTerms => Err(ProviderError::RequestFailed("not scripted".to_string())),
    })
}

/// Gateway over a mock provider with default service settings
pub fn gateway_with(provider: MockProvider) -> Arc<ModelGateway> {
    Arc::new(ModelGateway::new(Arc::new(provider), &ApiConfig::default()))
}

/// Controller translating from `input_root` into `output_root`
pub fn controller_with(provider: MockProvider, input_root: &Path, output_root: &Path) -> Controller {
    Controller::new(
        Arc::new(GlossaryStore::new(input_root.join("terminology.csv"))),
        gateway_with(provider),
        input_root,
        Some(output_root.to_path_buf()),
    )
}
