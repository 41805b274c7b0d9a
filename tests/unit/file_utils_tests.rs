/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::common;
use mdtranslate::errors::DocumentError;
use mdtranslate::file_utils::FileManager;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.md", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.md"));
}

#[test]
fn test_is_markdown_shouldIgnoreCase() {
    assert!(FileManager::is_markdown("a.md"));
    assert!(FileManager::is_markdown("b.Md"));
    assert!(!FileManager::is_markdown("c.markdown"));
    assert!(!FileManager::is_markdown("README"));
}

#[test]
fn test_find_markdown_files_withNestedTree_shouldReturnSortedPaths() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "z.md", "z")?;
    common::create_test_file(root, "a/b/deep.md", "deep")?;
    common::create_test_file(root, "a/notes.txt", "skip")?;

    let files = FileManager::find_markdown_files(root)?;

    assert_eq!(files, vec![root.join("a/b/deep.md"), root.join("z.md")]);
    Ok(())
}

#[test]
fn test_find_markdown_files_withFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "one.md", "x")?;

    assert!(FileManager::find_markdown_files(&file).is_err());
    Ok(())
}

#[test]
fn test_read_document_withUtf8_shouldKeepContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "utf8.md", "# 标题\n\nNaïve text\n")?;

    assert_eq!(FileManager::read_document(&file)?, "# 标题\n\nNaïve text\n");
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("x").join("y").join("out.md");

    FileManager::write_to_file(&target, "hello")?;

    assert_eq!(fs::read_to_string(&target)?, "hello");
    Ok(())
}

#[test]
fn test_append_to_file_withMissingFile_shouldReturnWriteError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::append_to_file(temp_dir.path().join("missing.md"), "x");

    assert!(matches!(result, Err(DocumentError::Write { .. })));
    Ok(())
}

#[test]
fn test_mirrored_output_path_withRelativeRoots_shouldJoin() {
    let output = FileManager::mirrored_output_path("docs/part/ch1.txt", "docs", "out");
    assert_eq!(output, Path::new("out/part/ch1.md"));
}
