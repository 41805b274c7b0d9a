/*!
 * End-to-end tests for terminology extraction and its use in translation
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;

use crate::common;
use mdtranslate::errors::ProviderError;
use mdtranslate::providers::mock::MockProvider;
use mdtranslate::providers::RequestPurpose;
use mdtranslate::RunMode;

const CHAPTER: &str = "Binary search trees keep keys sorted and every algorithm here relies on that.\n\
```python\ndef search(tree, key):\n    pass\n```\n";

fn extracting_provider(listing: &'static str) -> MockProvider {
    MockProvider::with_responder(move |req| match req.purpose {
        RequestPurpose::ExtractTerms => Ok(listing.to_string()),
        _ => Err(ProviderError::RequestFailed("not scripted".to_string())),
    })
}

#[tokio::test]
async fn test_extract_terminology_shouldSaveSortedGlossary() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "chapter.md", CHAPTER)?;
    let provider = extracting_provider("data structure: 数据结构\nAlgorithm: 算法\nnot a term line");
    let controller = common::controller_with(provider.clone(), input.path(), output.path());

    let added = controller.extract_terminology(&file).await?;

    assert_eq!(added, 2);
    // the code unit is never sent
    assert_eq!(provider.request_count(), 1);
    let saved = fs::read_to_string(input.path().join("terminology.csv"))?;
    assert_eq!(saved, "english,chinese\nalgorithm,算法\ndata structure,数据结构\n");
    Ok(())
}

#[tokio::test]
async fn test_extract_terminology_withExistingTerm_shouldKeepStoredTranslation() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "chapter.md", CHAPTER)?;
    let controller = common::controller_with(extracting_provider("API: 接口"), input.path(), output.path());
    controller.glossary().insert("api", "应用程序接口");

    let added = controller.extract_terminology(&file).await?;

    assert_eq!(added, 0);
    assert_eq!(controller.glossary().get("API").as_deref(), Some("应用程序接口"));
    Ok(())
}

#[tokio::test]
async fn test_run_extract_withDirectory_shouldVisitEveryDocument() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "a.md", CHAPTER)?;
    common::create_test_file(input.path(), "nested/b.MD", CHAPTER)?;
    let provider = extracting_provider("tree: 树");
    let controller = common::controller_with(provider.clone(), input.path(), output.path());

    controller.run(input.path(), RunMode::Extract).await?;

    assert_eq!(provider.request_count(), 2);
    assert_eq!(controller.glossary().len(), 1);
    assert!(input.path().join("terminology.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_afterExtraction_shouldSendMatchedTerms() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "chapter.md", CHAPTER)?;

    let system_prompts = Arc::new(Mutex::new(Vec::new()));
    let captured = system_prompts.clone();
    let provider = MockProvider::with_responder(move |req| match req.purpose {
        RequestPurpose::ExtractTerms => Ok("algorithm: 算法".to_string()),
        RequestPurpose::Translate => {
            captured.lock().push(req.system_prompt.clone());
            Ok("译文".to_string())
        }
        _ => Ok("译文".to_string()),
    });
    let controller = common::controller_with(provider, input.path(), output.path());

    controller.run(&file, RunMode::Extract).await?;
    controller.run(&file, RunMode::Translate).await?;

    let prompts = system_prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("algorithm: 算法"));
    assert!(output.path().join("chapter.md").exists());
    Ok(())
}
