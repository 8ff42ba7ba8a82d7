//! The entry database: one JSON object keyed by entry title.
//!
//! Entries are written in the order given (the integrator passes them sorted
//! by title, case-insensitively), pretty-printed with 4-space indentation.
//! Values are bare entries; values wrapped as `{"existing_entry": {...}}` by
//! older tooling are accepted on read.

use crate::types::{Entry, Envelope, Origin, sort_by_title};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot read store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot write store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Wrapped(Envelope),
    Plain(Entry),
}

impl StoredRecord {
    fn into_entry(self) -> Entry {
        let mut entry = match self {
            StoredRecord::Wrapped(envelope) => envelope.into_entry().0,
            StoredRecord::Plain(entry) => entry,
        };
        entry.origin = Origin::Existing;
        entry
    }
}

/// Serializes a slice of entries as a title-keyed object, preserving slice order.
struct StoreDocument<'a>(&'a [Entry]);

impl Serialize for StoreDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.title, entry)?;
        }
        map.end()
    }
}

/// Parse store JSON into entries sorted by title.
///
/// An entry whose inner `title` is empty takes its key as title. When two keys
/// hold the same inner title, one entry survives: the value stored under its
/// own title, else the last key in key order.
pub fn parse_store(content: &str) -> Result<Vec<Entry>, serde_json::Error> {
    let records: BTreeMap<String, StoredRecord> = serde_json::from_str(content)?;
    let mut by_title: BTreeMap<String, (String, Entry)> = BTreeMap::new();
    for (key, record) in records {
        let mut entry = record.into_entry();
        if entry.title.is_empty() {
            entry.title = key.clone();
        }
        if let Some((kept_key, kept)) = by_title.get(&entry.title) {
            let keep_previous = *kept_key == kept.title && key != entry.title;
            let (kept_key, dropped_key) = if keep_previous {
                (kept_key.as_str(), key.as_str())
            } else {
                (key.as_str(), kept_key.as_str())
            };
            warn!(
                title = %entry.title,
                kept = kept_key,
                dropped = dropped_key,
                "store holds one title under two keys, keeping one"
            );
            if keep_previous {
                continue;
            }
        }
        by_title.insert(entry.title.clone(), (key, entry));
    }
    let mut entries: Vec<Entry> = by_title.into_values().map(|(_, entry)| entry).collect();
    sort_by_title(&mut entries);
    Ok(entries)
}

/// Render entries as the store document: 4-space indented, trailing newline.
pub fn to_store_json(entries: &[Entry]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    StoreDocument(entries).serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Load the store. A store that doesn't exist yet is empty.
pub fn load_store(path: &Path) -> Result<Vec<Entry>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_store(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite the store with `entries`, in the order given.
pub fn save_store(path: &Path, entries: &[Entry]) -> Result<(), StoreError> {
    let json = to_store_json(entries)?;
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)
    };
    write().map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, Resource, TopicAssignment};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn entry(title: &str) -> Entry {
        let mut e = Entry {
            title: title.to_string(),
            description: format!("About {title}"),
            date: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            ..Default::default()
        };
        e.data.classification = Classification {
            kind: "Tool".into(),
            subtype: "CLI".into(),
        };
        e.data.topics = vec![TopicAssignment::new("Dev", &["CLI"])];
        e.resources = vec![Resource {
            name: "GitHub".into(),
            payload: format!("https://github.com/{title}"),
        }];
        e
    }

    #[test]
    fn save_then_load_keeps_entries_and_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("treasures.json");
        let entries = vec![entry("alpha"), entry("Beta"), entry("gamma")];

        save_store(&path, &entries).unwrap();
        let loaded = load_store(&path).unwrap();

        assert_eq!(loaded, entries);
    }

    #[test]
    fn store_is_indented_with_four_spaces() {
        let json = to_store_json(&[entry("alpha")]).unwrap();
        assert!(json.starts_with("{\n    \"alpha\": {\n        \"title\": \"alpha\""));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn keys_follow_slice_order_not_byte_order() {
        let json = to_store_json(&[entry("apple"), entry("Banana")]).unwrap();
        let apple = json.find("\"apple\":").unwrap();
        let banana = json.find("\"Banana\":").unwrap();
        assert!(apple < banana);
    }

    #[test]
    fn load_sorts_case_insensitively() {
        let json = r#"{ "zeta": { "title": "zeta" }, "Alpha": { "title": "Alpha" }, "beta": { "title": "beta" } }"#;
        let entries = parse_store(json).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn missing_store_is_empty() {
        let tmp = TempDir::new().unwrap();
        let entries = load_store(&tmp.path().join("nope.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn malformed_store_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("treasures.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(load_store(&path), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn wrapped_values_are_accepted() {
        let json = r#"{ "old": { "existing_entry": { "title": "old", "tags": ["go"] } } }"#;
        let entries = parse_store(json).unwrap();
        assert_eq!(entries[0].title, "old");
        assert_eq!(entries[0].tags, vec!["go"]);
        assert_eq!(entries[0].origin, Origin::Existing);
    }

    #[test]
    fn key_fills_missing_title() {
        let entries = parse_store(r#"{ "keyed": { "description": "d" } }"#).unwrap();
        assert_eq!(entries[0].title, "keyed");
    }

    #[test]
    fn one_title_under_two_keys_loads_once() {
        let json = r#"{
            "rg": { "title": "ripgrep", "description": "one" },
            "ripgrep": { "title": "ripgrep", "description": "two" },
            "zz": { "title": "ripgrep", "description": "three" }
        }"#;
        let entries = parse_store(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "two");
    }

    #[test]
    fn stray_keys_for_one_title_keep_the_last() {
        let json = r#"{
            "a": { "title": "ripgrep", "description": "one" },
            "b": { "title": "ripgrep", "description": "two" }
        }"#;
        let entries = parse_store(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "two");
    }

    #[test]
    fn duplicate_titles_do_not_survive_a_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("treasures.json");
        fs::write(
            &path,
            r#"{ "rg": { "title": "ripgrep", "description": "one" },
                 "ripgrep": { "title": "ripgrep", "description": "two" } }"#,
        )
        .unwrap();

        let entries = load_store(&path).unwrap();
        save_store(&path, &entries).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("\"ripgrep\": {").count(), 1);
        assert_eq!(load_store(&path).unwrap(), entries);
    }

    #[test]
    fn fixture_store_loads() {
        let tmp = crate::test_helpers::setup_fixtures();
        let entries = load_store(&tmp.path().join("sources/treasures.json")).unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.date.is_some()));
    }
}
