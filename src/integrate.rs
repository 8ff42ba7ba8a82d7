//! Integration: promote staged entries into the store.
//!
//! ```text
//! to_integrate/*.json ──┐
//!                       ├─ merge ─→ sorted entries ─→ treasures.json
//! treasures.json ───────┘                 └─ delete consumed staged files
//! ```
//!
//! Staged entries are stamped with the integration time and flagged `new`;
//! entries already in the store lose their `new` flag. The merged list is
//! sorted by title, case-insensitively, and every entry's flags are
//! de-duplicated. A staged entry whose title already exists in the store
//! replaces the stored one.
//!
//! The store is read before anything is written. If it can't be parsed,
//! integration stops: no store write, no staged file deleted.

use crate::config::ProjectPaths;
use crate::staging::{self, SkippedFile, StagingError};
use crate::store::{self, StoreError};
use crate::types::{Entry, Origin, sort_by_title};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum IntegrateError {
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of merging staged entries with the store contents.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    /// All entries, sorted by title.
    pub entries: Vec<Entry>,
    /// Titles of stored entries replaced by a staged entry.
    pub replaced: Vec<String>,
}

/// What an integration pass did, for reporting.
#[derive(Debug, Clone, Default)]
pub struct IntegrationReport {
    pub integrated: Vec<String>,
    pub replaced: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub delete_failures: Vec<(PathBuf, String)>,
    pub total_entries: usize,
}

/// Merge staged entries into the existing ones. Pure: no I/O.
///
/// Staged entries get `date = now` and the `new` flag; existing entries lose
/// it. When two staged entries share a title the later one wins.
pub fn merge(staged: Vec<Entry>, existing: Vec<Entry>, now: DateTime<Utc>) -> Merged {
    let mut by_title: HashMap<String, Entry> = HashMap::new();
    let mut order = Vec::new();
    for mut entry in staged {
        entry.origin = Origin::New;
        entry.date = Some(now);
        entry.mark_new();
        if by_title.contains_key(&entry.title) {
            warn!(title = %entry.title, "entry staged twice, keeping the last one");
        } else {
            order.push(entry.title.clone());
        }
        by_title.insert(entry.title.clone(), entry);
    }
    let mut fresh: Vec<Entry> = order
        .iter()
        .filter_map(|title| by_title.remove(title))
        .collect();

    let staged_titles: HashSet<&str> = fresh.iter().map(|e| e.title.as_str()).collect();
    let mut replaced = Vec::new();
    let mut kept = Vec::with_capacity(existing.len());
    for mut entry in existing {
        if staged_titles.contains(entry.title.as_str()) {
            info!(title = %entry.title, "staged entry replaces stored entry");
            replaced.push(entry.title);
            continue;
        }
        entry.origin = Origin::Existing;
        entry.clear_new();
        entry.dedup_flags();
        kept.push(entry);
    }

    fresh.append(&mut kept);
    sort_by_title(&mut fresh);
    Merged {
        entries: fresh,
        replaced,
    }
}

/// Run a full integration pass against the project's files.
pub fn integrate(paths: &ProjectPaths, now: DateTime<Utc>) -> Result<IntegrationReport, IntegrateError> {
    let batch = staging::read_staged(&paths.staging_dir)?;

    let existing = store::load_store(&paths.store).map_err(|e| {
        error!(error = %e, "cannot load store, integration aborted");
        e
    })?;

    let integrated: Vec<String> = batch.files.iter().map(|f| f.entry.title.clone()).collect();
    let staged_entries = batch.files.iter().map(|f| f.entry.clone()).collect();
    let merged = merge(staged_entries, existing, now);

    store::save_store(&paths.store, &merged.entries)?;
    info!(
        store = %paths.store.display(),
        entries = merged.entries.len(),
        integrated = integrated.len(),
        "store written"
    );

    let delete_failures = staging::remove_staged(batch.files.iter().map(|f| f.path.as_path()));

    Ok(IntegrationReport {
        integrated,
        replaced: merged.replaced,
        skipped: batch.skipped,
        delete_failures,
        total_entries: merged.entries.len(),
    })
}
