/*!
 * End-to-end tests for document and directory translation
 */

use anyhow::Result;
use std::fs;

use crate::common;
use mdtranslate::errors::ProviderError;
use mdtranslate::providers::mock::MockProvider;
use mdtranslate::providers::RequestPurpose;
use mdtranslate::translation::ProgressContext;

#[tokio::test]
async fn test_translate_file_withShortProse_shouldWriteSingleUnit() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "doc.md", "# T\n\npara one\n\npara two\n")?;
    let provider = common::scripted_provider("T翻译", "Critical: None", "T翻译");
    let controller = common::controller_with(provider.clone(), input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success, "{:?}", result.error_message);
    let output_path = result.output_path.expect("output path");
    assert_eq!(output_path, output.path().join("doc.md"));
    assert_eq!(fs::read_to_string(&output_path)?, "T翻译\n\n");
    // translate, review, polish
    assert_eq!(provider.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withCodeBlock_shouldCopyCodeVerbatim() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "mixed.md", "intro\n```\ncode line\n```\nend\n")?;
    let controller = common::controller_with(common::scripted_provider("译", "ok", "译"), input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success);
    let written = fs::read_to_string(output.path().join("mixed.md"))?;
    assert_eq!(written, "译\n\n```\ncode line\n```\n\n\n译\n\n");
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withOnlyCode_shouldNotCallModel() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "code.md", "```rust\nfn main() {}\n```\n")?;
    let provider = MockProvider::failing();
    let controller = common::controller_with(provider.clone(), input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(fs::read_to_string(output.path().join("code.md"))?, "```rust\nfn main() {}\n```\n\n\n");
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withRandomLatency_shouldKeepDocumentOrder() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;

    let mut document = String::new();
    let mut expected = String::new();
    for i in 0..24 {
        document.push_str(&format!("p{}\n```\nc{}\n```\n", i, i));
        expected.push_str(&format!("译p{}\n\n```\nc{}\n```\n\n\n", i, i));
    }
    let file = common::create_test_file(input.path(), "long.md", &document)?;

    // polish fails so the draft translation is kept
    let provider = MockProvider::with_responder(|req| match req.purpose {
        RequestPurpose::Translate => Ok(format!("译{}", req.user_prompt.trim())),
        RequestPurpose::Review => Ok("ok".to_string()),
        _ => Err(ProviderError::RequestFailed("polish unavailable".to_string())),
    })
    .with_delay(|req| req.user_prompt.bytes().map(u64::from).sum::<u64>() % 40);
    let controller = common::controller_with(provider, input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success);
    assert_eq!(fs::read_to_string(output.path().join("long.md"))?, expected);
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withFailingModel_shouldEmitSourceText() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "doc.md", "Hello world paragraph.\n")?;
    let controller = common::controller_with(MockProvider::failing(), input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success);
    assert_eq!(fs::read_to_string(output.path().join("doc.md"))?, "Hello world paragraph.\n\n\n");
    assert_eq!(controller.progress(), ProgressContext::default());
    assert_eq!(controller.gateway().usage().failures, 1);
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withPanickingUnit_shouldKeepItsSourceText() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "doc.md", "alpha\n```\nc\n```\nbeta\n")?;
    let provider = MockProvider::with_responder(|req| {
        if req.user_prompt.contains("beta") {
            panic!("responder crashed");
        }
        Ok("甲".to_string())
    });
    let controller = common::controller_with(provider, input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert!(result.success);
    assert_eq!(fs::read_to_string(output.path().join("doc.md"))?, "甲\n\n```\nc\n```\n\n\nbeta\n\n\n");
    Ok(())
}

#[tokio::test]
async fn test_translate_file_withNonMarkdownExtension_shouldWriteMarkdown() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let file = common::create_test_file(input.path(), "notes/readme.txt", "Plain notes here.\n")?;
    let controller = common::controller_with(common::scripted_provider("笔记", "ok", "笔记"), input.path(), output.path());

    let result = controller.translate_file(&file).await;

    assert_eq!(result.output_path, Some(output.path().join("notes").join("readme.md")));
    assert_eq!(fs::read_to_string(output.path().join("notes/readme.md"))?, "笔记\n\n");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_translate_directory_withUnreadableFile_shouldContinue() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "sub/good.md", "A good document.\n")?;
    let bad = input.path().join("bad.md");
    std::os::unix::fs::symlink(input.path().join("nowhere.md"), &bad)?;
    let controller = common::controller_with(common::scripted_provider("好", "ok", "好"), input.path(), output.path());

    let report = controller.translate_directory().await?;

    assert_eq!(report.success_count, 1);
    assert_eq!(report.failed_files.len(), 1);
    assert_eq!(report.failed_files[0].0, bad);
    assert_eq!(report.total(), 2);
    assert_eq!(fs::read_to_string(output.path().join("sub").join("good.md"))?, "好\n\n");
    Ok(())
}

#[tokio::test]
async fn test_translate_directory_withNoMarkdown_shouldReportNothing() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "notes.txt", "not markdown")?;
    let provider = MockProvider::working();
    let controller = common::controller_with(provider.clone(), input.path(), output.path());

    let report = controller.translate_directory().await?;

    assert_eq!(report.total(), 0);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}
