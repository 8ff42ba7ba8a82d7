//! The staging area: one `<title>.json` file per entry awaiting integration.
//!
//! Files hold a `new_entry` envelope with the `to_integrate` marker. Reading is
//! lenient: unparseable files are reported and skipped so one bad file never
//! blocks the rest of the batch.

use crate::types::{Entry, Envelope, StagedEntry};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("title {0:?} cannot be used as a file name")]
    InvalidTitle(String),
}

/// A staged file that was read successfully and is marked for integration.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub entry: Entry,
}

/// Why a staged file was left out of the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Unreadable(String),
    Malformed(String),
    NotMarked,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::Malformed(e) => write!(f, "malformed JSON: {e}"),
            SkipReason::NotMarked => write!(f, "not marked for integration"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Everything found in the staging directory, in file-name order.
#[derive(Debug, Clone, Default)]
pub struct StagedBatch {
    pub files: Vec<StagedFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Path of the staged file for `title`.
pub fn staged_path(staging_dir: &Path, title: &str) -> Result<PathBuf, StagingError> {
    let trimmed = title.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0'])
    {
        return Err(StagingError::InvalidTitle(title.to_string()));
    }
    Ok(staging_dir.join(format!("{title}.json")))
}

/// Write `entry` to the staging area, marked for integration.
///
/// Returns the written path. An existing file for the same title is replaced.
pub fn write_staged(staging_dir: &Path, entry: &Entry) -> Result<PathBuf, StagingError> {
    let path = staged_path(staging_dir, &entry.title)?;
    let json = staged_json(entry)?;
    fs::create_dir_all(staging_dir)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// The staged file content for `entry`: a marked `new_entry` envelope.
pub fn staged_json(entry: &Entry) -> Result<String, serde_json::Error> {
    let envelope = Envelope::NewEntry(StagedEntry {
        to_integrate: true,
        entry: Entry {
            date: None,
            ..entry.clone()
        },
    });
    serde_json::to_string_pretty(&envelope)
}

/// Parse one staged file's content into an entry and its marker.
pub fn parse_staged(content: &str) -> Result<(Entry, bool), serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(content)?;
    Ok(envelope.into_entry())
}

/// Read every `*.json` file in the staging directory.
///
/// A missing directory is an empty batch. Unparseable and unmarked files land
/// in [`StagedBatch::skipped`].
pub fn read_staged(staging_dir: &Path) -> Result<StagedBatch, StagingError> {
    let mut batch = StagedBatch::default();
    if !staging_dir.is_dir() {
        warn!(dir = %staging_dir.display(), "staging directory not found, nothing to integrate");
        return Ok(batch);
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(staging_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable staged file");
                batch.skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };
        match parse_staged(&content) {
            Ok((entry, true)) => {
                debug!(file = %path.display(), title = %entry.title, "staged entry");
                batch.files.push(StagedFile { path, entry });
            }
            Ok((_, false)) => {
                warn!(file = %path.display(), "skipping staged file not marked for integration");
                batch.skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::NotMarked,
                });
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping malformed staged file");
                batch.skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::Malformed(e.to_string()),
                });
            }
        }
    }
    Ok(batch)
}

/// Delete consumed staged files. Failures are logged and returned; they never
/// stop the remaining deletions.
pub fn remove_staged<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<(PathBuf, String)> {
    let mut failures = Vec::new();
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!(file = %path.display(), error = %e, "could not delete staged file");
            failures.push((path.to_path_buf(), e.to_string()));
        }
    }
    failures
}
