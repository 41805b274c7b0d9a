/*!
 * Tests for the glossary store
 */

use anyhow::Result;
use std::fs;

use crate::common;
use mdtranslate::providers::mock::MockProvider;
use mdtranslate::translation::TermPair;
use mdtranslate::GlossaryStore;

#[test]
fn test_load_withHeaderAndRows_shouldFoldCase() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "terms.csv",
        "english,chinese\nData Structure,数据结构\nAPI,接口\n,孤儿\n",
    )?;

    let store = GlossaryStore::load(&path);

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("data structure").as_deref(), Some("数据结构"));
    assert_eq!(store.get("Api").as_deref(), Some("接口"));
    Ok(())
}

#[test]
fn test_load_withMissingTranslationColumn_shouldKeepTermEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "terms.csv", "english,chinese\nheap\nstack,栈\n")?;

    let store = GlossaryStore::load(&path);

    assert_eq!(store.get("stack").as_deref(), Some("栈"));
    assert_eq!(store.get("heap").as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_save_shouldExcludeEmptyTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("glossary").join("terms.csv");

    let store = GlossaryStore::new(&path);
    store.insert("Mutex", "互斥锁");
    store.insert("heap", "");
    store.insert("channel", "通道");
    store.save();

    assert_eq!(fs::read_to_string(&path)?, "english,chinese\nchannel,通道\nmutex,互斥锁\n");
    Ok(())
}

#[test]
fn test_find_relevant_withAlreadyPluralTerm_shouldStillMatchLiteral() {
    let store = GlossaryStore::new("unused.csv");
    store.insert("series", "系列");

    let found = store.find_relevant("A time series database stores points.");

    assert_eq!(found, vec![TermPair::new("series", "系列")]);
}

#[test]
fn test_find_relevant_withEmptyGlossary_shouldReturnEmpty() {
    let store = GlossaryStore::new("unused.csv");
    assert!(store.find_relevant("Plenty of text to look at here.").is_empty());
}

#[test]
fn test_find_relevant_shouldSkipEntriesWithoutTranslation() {
    let store = GlossaryStore::new("unused.csv");
    store.insert("kernel", "");
    store.insert("scheduler", "调度器");

    let found = store.find_relevant("The kernel scheduler picks the next task.");

    assert_eq!(found, vec![TermPair::new("scheduler", "调度器")]);
}

#[test]
fn test_extract_and_merge_withShortText_shouldNotCallModel() {
    let provider = MockProvider::working();
    let gateway = common::gateway_with(provider.clone());
    let store = GlossaryStore::new("unused.csv");

    let added = tokio_test::block_on(store.extract_and_merge("too short", &gateway));

    assert!(added.is_empty());
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_extract_and_merge_withFailingModel_shouldReturnEmpty() {
    let gateway = common::gateway_with(MockProvider::failing());
    let store = GlossaryStore::new("unused.csv");

    let added = store
        .extract_and_merge("Binary search trees keep their keys in sorted order.", &gateway)
        .await;

    assert!(added.is_empty());
    assert!(store.is_empty());
}
