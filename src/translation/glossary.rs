/*!
 * Persistent English to Chinese terminology table.
 *
 * Keys are case-folded source terms. The table is read concurrently by unit
 * tasks during translation and only written by the sequential extraction
 * mode, so a read/write lock is enough; it is never held across an await.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::GlossaryError;

use super::document::TermPair;
use super::gateway::ModelGateway;
use super::prompts;

/// Texts shorter than this are not worth a term extraction call
pub const MIN_EXTRACTION_CHARS: usize = 30;

/// Texts shorter than this are not matched against the glossary
pub const MIN_MATCH_CHARS: usize = 10;

/// One row of the glossary file
#[derive(Debug, Serialize, Deserialize)]
struct GlossaryRecord {
    english: String,
    #[serde(default)]
    chinese: String,
}

/// Case-insensitive terminology table backed by a CSV file
#[derive(Debug)]
pub struct GlossaryStore {
    path: PathBuf,
    terms: RwLock<BTreeMap<String, String>>,
}

impl GlossaryStore {
    /// Create an empty store that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            terms: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the glossary file, an absent or unreadable file gives an empty store
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let store = Self::new(path);
        if !store.path.exists() {
            info!("Glossary file {} not found, starting with an empty glossary", store.path.display());
            return store;
        }

        match read_records(&store.path) {
            Ok(terms) => {
                info!("Loaded {} glossary terms from {}", terms.len(), store.path.display());
                *store.terms.write() = terms;
            }
            Err(e) => error!("Failed to load glossary, starting empty: {}", e),
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.terms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.read().is_empty()
    }

    /// Look up a term case-insensitively
    pub fn get(&self, term: &str) -> Option<String> {
        self.terms.read().get(&term.trim().to_lowercase()).cloned()
    }

    /// Insert or replace an entry
    pub fn insert(&self, source: &str, target: &str) {
        self.terms.write().insert(source.trim().to_lowercase(), target.trim().to_string());
    }

    /// Persist the glossary, logging instead of failing
    pub fn save(&self) {
        match self.write_to(&self.path) {
            Ok(count) => debug!("Saved {} glossary terms to {}", count, self.path.display()),
            Err(e) => error!("Failed to save glossary: {}", e),
        }
    }

    /// Write every entry with a translation to `path`, sorted by term
    pub fn write_to(&self, path: &Path) -> Result<usize, GlossaryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| GlossaryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        let terms = self.terms.read();
        let mut count = 0;
        for (english, chinese) in terms.iter().filter(|(_, chinese)| !chinese.is_empty()) {
            writer.serialize(GlossaryRecord {
                english: english.clone(),
                chinese: chinese.clone(),
            })?;
            count += 1;
        }
        // header is only emitted with the first record
        if count == 0 {
            writer.write_record(["english", "chinese"])?;
        }
        writer.flush().map_err(|source| GlossaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(count)
    }

    /// Merge extracted pairs; existing translations always win
    ///
    /// Returns the pairs that were newly added with a non-empty translation.
    pub fn merge_terms(&self, pairs: Vec<TermPair>) -> Vec<TermPair> {
        let mut terms = self.terms.write();
        let mut added = Vec::new();

        for pair in pairs {
            let english = pair.source.trim();
            let chinese = pair.target.trim();
            if english.is_empty() || chinese.is_empty() {
                warn!("Skipping malformed term entry: {:?}", pair);
                continue;
            }

            let key = english.to_lowercase();
            if terms.get(&key).is_some_and(|existing| !existing.is_empty()) {
                continue;
            }

            terms.insert(key, chinese.to_string());
            added.push(TermPair::new(english, chinese));
        }

        added
    }

    /// Ask the model for terms in `text` and merge them into the glossary
    pub async fn extract_and_merge(&self, text: &str, gateway: &ModelGateway) -> Vec<TermPair> {
        if text.chars().count() < MIN_EXTRACTION_CHARS {
            debug!("Text too short for term extraction");
            return Vec::new();
        }

        let extracted = gateway.extract_terms(text, prompts::TERM_EXTRACTION).await;
        let added = self.merge_terms(extracted);
        if !added.is_empty() {
            info!("Added {} new glossary terms", added.len());
        }
        added
    }

    /// Glossary entries that occur in `text`, longest terms first
    pub fn find_relevant(&self, text: &str) -> Vec<TermPair> {
        if text.chars().count() < MIN_MATCH_CHARS {
            return Vec::new();
        }

        let mut candidates: Vec<(String, String)> = {
            let terms = self.terms.read();
            terms
                .iter()
                .filter(|(english, chinese)| !english.is_empty() && !chinese.is_empty())
                .map(|(english, chinese)| (english.clone(), chinese.clone()))
                .collect()
        };
        if candidates.is_empty() {
            return Vec::new();
        }
        candidates.sort_by_key(|(english, _)| std::cmp::Reverse(english.chars().count()));

        let found: Vec<TermPair> = candidates
            .into_iter()
            .filter(|(english, _)| term_occurs(english, text))
            .map(|(english, chinese)| TermPair::new(english, chinese))
            .collect();

        debug!("Found {} relevant glossary terms", found.len());
        found
    }

    /// Render pairs as `source: target` lines for a prompt
    pub fn to_prompt_string(terms: &[TermPair]) -> String {
        terms
            .iter()
            .filter(|term| !term.target.is_empty())
            .map(|term| format!("{}: {}", term.source, term.target))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn read_records(path: &Path) -> Result<BTreeMap<String, String>, GlossaryError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut terms = BTreeMap::new();

    for record in reader.deserialize::<GlossaryRecord>() {
        match record {
            Ok(record) => {
                let english = record.english.trim().to_lowercase();
                if english.is_empty() {
                    continue;
                }
                terms.insert(english, record.chinese.trim().to_string());
            }
            Err(e) => warn!("Skipping malformed glossary row: {}", e),
        }
    }

    Ok(terms)
}

fn whole_word(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", pattern))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Heuristic English plural of a glossary term, as a regex fragment
fn plural_pattern(term: &str) -> String {
    const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    let mut chars = term.chars().rev();
    let last = chars.next();
    let before_last = chars.next();

    if SIBILANT_ENDINGS.iter().any(|ending| term.ends_with(ending)) {
        format!("{}es", regex::escape(term))
    } else if last == Some('y') && before_last.is_some_and(|c| !"aeiou".contains(c)) {
        format!("{}ies", regex::escape(&term[..term.len() - 1]))
    } else {
        format!("{}s", regex::escape(term))
    }
}

fn term_occurs(term: &str, text: &str) -> bool {
    if whole_word(&regex::escape(term)).is_some_and(|re| re.is_match(text)) {
        return true;
    }

    // a term that already matches its own plural form is not inflected further
    match whole_word(&plural_pattern(term)) {
        Some(plural) => !plural.is_match(term) && plural.is_match(text),
        None => false,
    }
}
