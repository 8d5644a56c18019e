//! Source document parsing.
//!
//! Two formats are read from the source directory:
//! - `.json`: one array; each string entry, or object entry with a string
//!   `content` field, is a chunk
//! - `.jsonl`: one value per line with the same entry rules; malformed lines
//!   are skipped and counted

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::errors::RagError;

/// Chunk texts extracted from a source directory, in enumeration order.
#[derive(Debug, Default)]
pub struct ExtractedSource {
    pub texts: Vec<String>,
    pub files: usize,
    pub skipped_lines: usize,
    pub skipped_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Json,
    JsonLines,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(SourceFormat::Json),
            Some("jsonl") => Some(SourceFormat::JsonLines),
            _ => None,
        }
    }
}

/// Reads every `.json` / `.jsonl` file in `dir`, sorted by file name.
pub fn load_source_dir(dir: &Path) -> Result<ExtractedSource, RagError> {
    if !dir.is_dir() {
        return Err(RagError::SourceMissing(dir.to_path_buf()));
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut extracted = ExtractedSource::default();
    for path in paths {
        let Some(format) = SourceFormat::from_path(&path) else {
            tracing::debug!("Skipping non-JSON source file {}", path.display());
            continue;
        };

        let contents = fs::read_to_string(&path)?;
        let before = extracted.texts.len();
        match format {
            SourceFormat::Json => {
                let (texts, skipped) = parse_json_document(&path, &contents)?;
                extracted.texts.extend(texts);
                extracted.skipped_entries += skipped;
            }
            SourceFormat::JsonLines => {
                let parsed = parse_jsonl_document(&contents);
                if parsed.malformed_lines > 0 {
                    tracing::warn!(
                        "Skipped {} malformed line(s) in {}",
                        parsed.malformed_lines,
                        path.display()
                    );
                }
                extracted.texts.extend(parsed.texts);
                extracted.skipped_lines += parsed.malformed_lines;
                extracted.skipped_entries += parsed.skipped_entries;
            }
        }
        extracted.files += 1;
        tracing::debug!(
            "Extracted {} chunk(s) from {}",
            extracted.texts.len() - before,
            path.display()
        );
    }

    Ok(extracted)
}

/// Text carried by one entry, if it has any.
pub fn entry_text(entry: &Value) -> Option<String> {
    match entry {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("content")
            .and_then(|c| c.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Parses a whole-file JSON array, returning texts and the skipped entry count.
pub fn parse_json_document(path: &Path, contents: &str) -> Result<(Vec<String>, usize), RagError> {
    let value: Value = serde_json::from_str(contents).map_err(|e| RagError::SourceParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let Value::Array(entries) = value else {
        return Err(RagError::SourceParse {
            path: path.to_path_buf(),
            detail: "expected a JSON array of entries".to_string(),
        });
    };

    let texts: Vec<String> = entries.iter().filter_map(entry_text).collect();
    let skipped = entries.len() - texts.len();
    Ok((texts, skipped))
}

#[derive(Debug, Default)]
pub struct JsonLines {
    pub texts: Vec<String>,
    pub malformed_lines: usize,
    pub skipped_entries: usize,
}

pub fn parse_jsonl_document(contents: &str) -> JsonLines {
    let mut parsed = JsonLines::default();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<Value>(line) {
            Ok(entry) => match entry_text(&entry) {
                Some(text) => parsed.texts.push(text),
                None => parsed.skipped_entries += 1,
            },
            Err(_) => parsed.malformed_lines += 1,
        }
    }
    parsed
}
