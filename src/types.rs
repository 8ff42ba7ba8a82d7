//! Entry data model shared by every stage.
//!
//! The same [`Entry`] shape is used for store values and staged payloads.
//! On disk, staged files wrap the entry in a `new_entry` envelope carrying the
//! `to_integrate` marker; store values are written bare and keyed by title.
//!
//! ```text
//! {
//!     "title": "ripgrep",
//!     "description": "Fast recursive search",
//!     "date": "2026-10-18T12:00:00Z",
//!     "data": {
//!         "types": { "type": "Tool", "subtype": "CLI" },
//!         "topics": [ { "topic": "Dev", "subtopics": ["CLI"] } ],
//!         "flags": ["new"]
//!     },
//!     "tags": ["rust"],
//!     "ressources": [ { "name": "GitHub", "payload": "https://github.com/..." } ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flag stamped on freshly integrated entries and cleared on the next integration.
pub const NEW_FLAG: &str = "new";

/// Where an in-memory entry came from during an integration pass.
///
/// Never serialized: the envelope key (`new_entry` / `existing_entry`) or the
/// file it was read from decides the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Read from the staging area in this pass.
    New,
    /// Read from the store.
    #[default]
    Existing,
}

/// Main type and optional subtype, e.g. `Tool` / `CLI`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: String,
    /// Empty when no subtype was chosen.
    #[serde(default)]
    pub subtype: String,
}

/// One topic pairing. No subtopics means the entry sits at the topic's top level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl TopicAssignment {
    pub fn new(topic: &str, subtopics: &[&str]) -> Self {
        Self {
            topic: topic.to_string(),
            subtopics: subtopics.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A named link target. `name` refers to a resource kind in the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub payload: String,
}

/// Classification block nested under `data` in the on-disk shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryData {
    #[serde(rename = "types", default)]
    pub classification: Classification,
    #[serde(default)]
    pub topics: Vec<TopicAssignment>,
    #[serde(default)]
    pub flags: Vec<String>,
}

/// A curated link record.
///
/// The title is the store key and must be unique. The first resource is the
/// primary link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip)]
    pub origin: Origin,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Stamped at integration; absent on staged entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: EntryData,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "ressources")]
    pub resources: Vec<Resource>,
}

impl Entry {
    pub fn is_new(&self) -> bool {
        self.data.flags.iter().any(|f| f == NEW_FLAG)
    }

    pub fn primary_resource(&self) -> Option<&Resource> {
        self.resources.first()
    }

    /// Resources after the primary one, in declaration order.
    pub fn secondary_resources(&self) -> &[Resource] {
        self.resources.get(1..).unwrap_or(&[])
    }

    /// Flags other than [`NEW_FLAG`], which is rendered as its own badge.
    pub fn display_flags(&self) -> impl Iterator<Item = &str> {
        self.data
            .flags
            .iter()
            .map(String::as_str)
            .filter(|f| *f != NEW_FLAG)
    }

    /// Add the `new` flag, keeping flags duplicate-free.
    pub fn mark_new(&mut self) {
        self.data.flags.push(NEW_FLAG.to_string());
        self.dedup_flags();
    }

    pub fn clear_new(&mut self) {
        self.data.flags.retain(|f| f != NEW_FLAG);
    }

    /// Remove duplicate flags, keeping the first occurrence of each.
    pub fn dedup_flags(&mut self) {
        let mut seen = HashSet::new();
        self.data.flags.retain(|f| seen.insert(f.clone()));
    }
}

/// Sort entries by title, case-insensitively, ascending.
///
/// The sort is stable, so titles differing only in case keep their input order.
pub fn sort_by_title(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|e| e.title.to_lowercase());
}

/// A staged entry: the entry fields plus the integration marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StagedEntry {
    #[serde(default)]
    pub to_integrate: bool,
    #[serde(flatten)]
    pub entry: Entry,
}

/// Top-level discriminator used by staged files and legacy store values.
///
/// Serialized externally tagged: `{"new_entry": {...}}` or `{"existing_entry": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    NewEntry(StagedEntry),
    ExistingEntry(Entry),
}

impl Envelope {
    /// Unwrap into an entry tagged with its origin, plus the integration marker.
    ///
    /// Existing entries never carry a marker, so they report `false`.
    pub fn into_entry(self) -> (Entry, bool) {
        match self {
            Envelope::NewEntry(staged) => {
                let mut entry = staged.entry;
                entry.origin = Origin::New;
                (entry, staged.to_integrate)
            }
            Envelope::ExistingEntry(mut entry) => {
                entry.origin = Origin::Existing;
                (entry, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> Entry {
        Entry {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn sort_is_case_insensitive() {
        let mut entries = vec![entry("B-Tool"), entry("a-site")];
        sort_by_title(&mut entries);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a-site", "B-Tool"]);
    }

    #[test]
    fn sort_keeps_input_order_for_case_only_differences() {
        let mut entries = vec![entry("Zed"), entry("abc"), entry("ABC")];
        sort_by_title(&mut entries);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["abc", "ABC", "Zed"]);
    }

    #[test]
    fn mark_new_does_not_duplicate() {
        let mut e = entry("x");
        e.data.flags = vec!["new".into(), "free".into()];
        e.mark_new();
        assert_eq!(e.data.flags, vec!["new", "free"]);
        assert!(e.is_new());
    }

    #[test]
    fn dedup_flags_keeps_first_occurrence() {
        let mut e = entry("x");
        e.data.flags = vec!["b".into(), "a".into(), "b".into(), "a".into()];
        e.dedup_flags();
        assert_eq!(e.data.flags, vec!["b", "a"]);
    }

    #[test]
    fn clear_new_removes_every_occurrence() {
        let mut e = entry("x");
        e.data.flags = vec!["new".into(), "paid".into(), "new".into()];
        e.clear_new();
        assert_eq!(e.data.flags, vec!["paid"]);
        assert!(!e.is_new());
    }

    #[test]
    fn display_flags_hide_new() {
        let mut e = entry("x");
        e.data.flags = vec!["new".into(), "paid".into()];
        assert_eq!(e.display_flags().collect::<Vec<_>>(), vec!["paid"]);
    }

    #[test]
    fn secondary_resources_skip_primary() {
        let mut e = entry("x");
        assert!(e.primary_resource().is_none());
        assert!(e.secondary_resources().is_empty());

        e.resources = vec![
            Resource {
                name: "GitHub".into(),
                payload: "https://github.com/x".into(),
            },
            Resource {
                name: "Website".into(),
                payload: "https://x.dev".into(),
            },
        ];
        assert_eq!(e.primary_resource().unwrap().name, "GitHub");
        assert_eq!(e.secondary_resources().len(), 1);
        assert_eq!(e.secondary_resources()[0].name, "Website");
    }

    #[test]
    fn staged_envelope_parses_source_shape() {
        let json = r#"{
            "new_entry": {
                "to_integrate": true,
                "title": "ripgrep",
                "description": "Fast search",
                "data": {
                    "types": { "type": "Tool", "subtype": "" },
                    "topics": [ { "topic": "Dev", "subtopics": ["CLI"] } ],
                    "flags": ["free"]
                },
                "tags": ["rust"],
                "ressources": [ { "name": "GitHub", "payload": "https://github.com/BurntSushi/ripgrep" } ]
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        let (entry, marked) = envelope.into_entry();
        assert!(marked);
        assert_eq!(entry.origin, Origin::New);
        assert_eq!(entry.title, "ripgrep");
        assert_eq!(entry.data.classification.kind, "Tool");
        assert_eq!(entry.data.topics[0].subtopics, vec!["CLI"]);
        assert_eq!(entry.resources[0].name, "GitHub");
        assert!(entry.date.is_none());
    }

    #[test]
    fn existing_envelope_is_never_marked() {
        let json = r#"{ "existing_entry": { "title": "old" } }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        let (entry, marked) = envelope.into_entry();
        assert!(!marked);
        assert_eq!(entry.origin, Origin::Existing);
    }

    #[test]
    fn entry_serializes_without_origin_or_missing_date() {
        let e = entry("x");
        let value = serde_json::to_value(&e).unwrap();
        assert!(value.get("origin").is_none());
        assert!(value.get("date").is_none());
        assert!(value.get("ressources").is_some());
        assert_eq!(value["data"]["types"]["type"], "");
    }
}
