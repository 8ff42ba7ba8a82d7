//! Read-only reference lists that entries are classified against.
//!
//! Five JSON files live in the data directory:
//!
//! ```text
//! sources/
//! ├── types.json        {"types": [{"maintype": "Tool", "subtypes": [{"subtype": "CLI"}]}]}
//! ├── topics.json       {"topics": [{"maintopic": "Dev", "subtopics": ["CLI", "Web"]}]}
//! ├── flags.json        {"flags": ["free", "paid"]}
//! ├── tags.json         {"tags": ["rust", "go"]}
//! └── ressources.json   {"ressources": [{"name": "GitHub", "color": "#24292e",
//!                                         "icon": "bi-github", "label": "Source"}]}
//! ```
//!
//! Nothing here is ever written back; the staging flow offers these lists as
//! choices and the renderer looks up display attributes for resource kinds.

use crate::types::Entry;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub const TYPES_FILE: &str = "types.json";
pub const TOPICS_FILE: &str = "topics.json";
pub const FLAGS_FILE: &str = "flags.json";
pub const TAGS_FILE: &str = "tags.json";
pub const RESOURCES_FILE: &str = "ressources.json";

#[derive(Debug, Clone, Deserialize)]
pub struct MainType {
    pub maintype: String,
    #[serde(default)]
    pub subtypes: Vec<SubType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubType {
    pub subtype: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainTopic {
    pub maintopic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

/// Display attributes for one kind of resource link.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceKind {
    pub name: String,
    /// CSS color used as the button background.
    pub color: String,
    /// Icon class, e.g. `bi-github`.
    #[serde(default)]
    pub icon: String,
    /// Button text; falls back to `name` when empty.
    #[serde(default)]
    pub label: String,
}

impl ResourceKind {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

#[derive(Deserialize)]
struct TypesFile {
    types: Vec<MainType>,
}

#[derive(Deserialize)]
struct TopicsFile {
    topics: Vec<MainTopic>,
}

#[derive(Deserialize)]
struct FlagsFile {
    flags: Vec<String>,
}

#[derive(Deserialize)]
struct TagsFile {
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct ResourcesFile {
    ressources: Vec<ResourceKind>,
}

/// All reference lists, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    pub types: Vec<MainType>,
    pub topics: Vec<MainTopic>,
    pub flags: Vec<String>,
    pub tags: Vec<String>,
    pub resource_kinds: Vec<ResourceKind>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, TaxonomyError> {
    let content = fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TaxonomyError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl Taxonomy {
    /// Load every reference file from `data_dir`. Any missing file is an error.
    pub fn load(data_dir: &Path) -> Result<Self, TaxonomyError> {
        Ok(Self {
            types: Self::load_types(data_dir)?,
            topics: Self::load_topics(data_dir)?,
            flags: read_json::<FlagsFile>(&data_dir.join(FLAGS_FILE))?.flags,
            tags: read_json::<TagsFile>(&data_dir.join(TAGS_FILE))?.tags,
            resource_kinds: read_json::<ResourcesFile>(&data_dir.join(RESOURCES_FILE))?
                .ressources,
        })
    }

    pub fn load_types(data_dir: &Path) -> Result<Vec<MainType>, TaxonomyError> {
        Ok(read_json::<TypesFile>(&data_dir.join(TYPES_FILE))?.types)
    }

    /// Only the topic list; the index builder needs nothing else.
    pub fn load_topics(data_dir: &Path) -> Result<Vec<MainTopic>, TaxonomyError> {
        Ok(read_json::<TopicsFile>(&data_dir.join(TOPICS_FILE))?.topics)
    }

    pub fn main_type(&self, name: &str) -> Option<&MainType> {
        self.types.iter().find(|t| t.maintype == name)
    }

    pub fn topic(&self, name: &str) -> Option<&MainTopic> {
        self.topics.iter().find(|t| t.maintopic == name)
    }

    pub fn resource_kind(&self, name: &str) -> Option<&ResourceKind> {
        self.resource_kinds.iter().find(|r| r.name == name)
    }

    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.maintype.clone()).collect()
    }

    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.maintopic.clone()).collect()
    }

    pub fn resource_kind_names(&self) -> Vec<String> {
        self.resource_kinds.iter().map(|r| r.name.clone()).collect()
    }
}

impl MainType {
    pub fn subtype_names(&self) -> Vec<String> {
        self.subtypes.iter().map(|s| s.subtype.clone()).collect()
    }
}

/// One way an entry disagrees with the reference lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIssue {
    pub title: String,
    pub message: String,
}

impl std::fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl Taxonomy {
    /// Every classification, flag, tag and resource of `entry` that the
    /// reference lists don't know. The `new` flag is always accepted.
    pub fn check_entry(&self, entry: &Entry) -> Vec<EntryIssue> {
        let mut messages = Vec::new();
        let class = &entry.data.classification;
        match self.main_type(&class.kind) {
            None => messages.push(format!("unknown type {:?}", class.kind)),
            Some(main) => {
                let known = main.subtypes.iter().any(|s| s.subtype == class.subtype);
                if !class.subtype.is_empty() && !known {
                    messages.push(format!("unknown subtype {}/{}", class.kind, class.subtype));
                }
            }
        }
        for pairing in &entry.data.topics {
            match self.topic(&pairing.topic) {
                None => messages.push(format!("unknown topic {:?}", pairing.topic)),
                Some(topic) => {
                    let unknown = pairing.subtopics.iter().filter(|s| !topic.subtopics.contains(s));
                    for sub in unknown {
                        messages.push(format!("unknown subtopic {}/{}", pairing.topic, sub));
                    }
                }
            }
        }
        for flag in entry.display_flags().filter(|f| !self.flags.iter().any(|k| k.as_str() == *f)) {
            messages.push(format!("unknown flag {flag:?}"));
        }
        for tag in entry.tags.iter().filter(|t| !self.tags.contains(t)) {
            messages.push(format!("unknown tag {tag:?}"));
        }
        let unknown_kinds = entry
            .resources
            .iter()
            .filter(|r| self.resource_kind(&r.name).is_none());
        for resource in unknown_kinds {
            messages.push(format!("unknown resource kind {:?}", resource.name));
        }
        if entry.resources.is_empty() {
            messages.push("no resources".to_string());
        }
        messages
            .into_iter()
            .map(|message| EntryIssue {
                title: entry.title.clone(),
                message,
            })
            .collect()
    }

    /// [`check_entry`](Self::check_entry) over a whole store.
    pub fn check_entries(&self, entries: &[Entry]) -> Vec<EntryIssue> {
        entries.iter().flat_map(|e| self.check_entry(e)).collect()
    }
}
