use anyhow::{Context, Result};
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::DocumentError;

// @module: File and directory utilities

/// Extension of translatable documents and of every output file
pub const MARKDOWN_EXTENSION: &str = "md";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @checks: Markdown extension, case-insensitive
    pub fn is_markdown<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MARKDOWN_EXTENSION))
    }

    /// Find every Markdown file below a directory, sorted by path
    ///
    /// Symlinks are listed but not followed; entries that cannot be walked
    /// are skipped with a warning.
    pub fn find_markdown_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(anyhow::anyhow!("Not a directory: {:?}", dir));
        }

        let mut result = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() && Self::is_markdown(entry.path()) {
                result.push(entry.into_path());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a document as UTF-8, falling back to Latin-1 for legacy files
    pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("{:?} is not valid UTF-8, decoding as Latin-1", path);
                Ok(encoding_rs::mem::decode_latin1(e.as_bytes()).into_owned())
            }
        }
    }

    /// Write a string to a file, replacing previous content
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_error = |source: std::io::Error| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent).map_err(write_error)?;
        }
        fs::write(path, content).map_err(write_error)
    }

    /// Append a string to an existing file
    pub fn append_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_error = |source: std::io::Error| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(write_error)?;
        file.write_all(content.as_bytes()).map_err(write_error)?;
        file.flush().map_err(write_error)
    }

    // @generates: Output path mirroring the input layout
    // @params: input_file, input_root, output_root
    pub fn mirrored_output_path<P1, P2, P3>(input_file: P1, input_root: P2, output_root: P3) -> PathBuf
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        P3: AsRef<Path>,
    {
        let input_file = input_file.as_ref();

        let relative = match input_file.strip_prefix(input_root.as_ref()) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => PathBuf::from(input_file.file_name().unwrap_or(input_file.as_os_str())),
        };

        output_root.as_ref().join(relative).with_extension(MARKDOWN_EXTENSION)
    }

    /// Short file name for log lines
    pub fn display_name<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.as_ref().display().to_string())
    }

    /// Canonical form of a user supplied path, for stable prefix stripping
    pub fn absolute<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        std::path::absolute(path.as_ref())
            .with_context(|| format!("Failed to resolve path: {:?}", path.as_ref()))
    }
}
