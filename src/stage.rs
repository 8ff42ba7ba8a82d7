//! Interactive flows: the top-level menu and staging a new entry.
//!
//! Staging walks the maintainer through every field, offering the taxonomy
//! lists as numbered choices:
//!
//! 1. title and description (free text)
//! 2. type, then an optional subtype when the type has any
//! 3. topics, repeated until declined, each with optional subtopics
//! 4. flags and tags (multi-select)
//! 5. resources, repeated until declined: kind plus URL
//!
//! The finished entry is echoed as JSON and written to the staging area as
//! `<title>.json`, marked for integration.

use crate::prompt::{PromptError, Session};
use crate::staging::{self, StagingError};
use crate::taxonomy::Taxonomy;
use crate::types::{Classification, Entry, Resource, TopicAssignment};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the top-level menu can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Stage,
    Integrate,
    Maintenance,
}

impl MenuAction {
    const ALL: [MenuAction; 3] = [
        MenuAction::Stage,
        MenuAction::Integrate,
        MenuAction::Maintenance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Stage => "Stage new treasure",
            MenuAction::Integrate => "Integrate new treasures",
            MenuAction::Maintenance => "Database maintenance",
        }
    }
}

/// Show the top-level menu and return the picked action.
pub fn choose_action<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
) -> Result<MenuAction, PromptError> {
    let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.label().to_string()).collect();
    let picked = session.select_index("What would you like to do?", &labels)?;
    Ok(MenuAction::ALL[picked])
}

/// Ask until the title is non-empty and usable as a file name.
fn prompt_title<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    staging_dir: &Path,
) -> Result<String, PromptError> {
    loop {
        let title = session.text("Enter the title:")?.trim().to_string();
        if staging::staged_path(staging_dir, &title).is_ok() {
            return Ok(title);
        }
        session.say("A title is required and must not contain '/' or '\\'.\n")?;
    }
}

fn prompt_classification<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    taxonomy: &Taxonomy,
) -> Result<Classification, PromptError> {
    let kind = session.select("Select a main type:", &taxonomy.type_names())?;
    let subtypes = taxonomy
        .main_type(&kind)
        .map(|t| t.subtype_names())
        .unwrap_or_default();
    let subtype = if subtypes.is_empty() {
        String::new()
    } else {
        session
            .select_optional("Select a subtype:", &subtypes)?
            .unwrap_or_default()
    };
    Ok(Classification { kind, subtype })
}

fn prompt_topics<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    taxonomy: &Taxonomy,
) -> Result<Vec<TopicAssignment>, PromptError> {
    let mut topics = Vec::new();
    loop {
        let topic = session.select("Select a main topic:", &taxonomy.topic_names())?;
        let options = taxonomy
            .topic(&topic)
            .map(|t| t.subtopics.clone())
            .unwrap_or_default();
        let subtopics = if options.is_empty() {
            Vec::new()
        } else {
            session.select_many("Select subtopics:", &options)?
        };
        topics.push(TopicAssignment { topic, subtopics });
        if !session.confirm("Add another topic?")? {
            return Ok(topics);
        }
    }
}

fn prompt_resources<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    taxonomy: &Taxonomy,
) -> Result<Vec<Resource>, PromptError> {
    let mut resources = Vec::new();
    loop {
        let name = session.select("Select a resource type:", &taxonomy.resource_kind_names())?;
        let payload = loop {
            let url = session
                .text(&format!("Enter the {name} link (full URL):"))?
                .trim()
                .to_string();
            if !url.is_empty() {
                break url;
            }
            session.say("A link is required.\n")?;
        };
        resources.push(Resource { name, payload });
        if !session.confirm("Add another resource?")? {
            return Ok(resources);
        }
    }
}

/// Collect a complete entry from the maintainer.
pub fn prompt_entry<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    taxonomy: &Taxonomy,
    staging_dir: &Path,
) -> Result<Entry, PromptError> {
    let title = prompt_title(session, staging_dir)?;
    let description = session.text("Enter the description:")?.trim().to_string();

    let mut entry = Entry {
        title,
        description,
        ..Default::default()
    };
    entry.data.classification = prompt_classification(session, taxonomy)?;
    entry.data.topics = prompt_topics(session, taxonomy)?;
    entry.data.flags = session.select_many("Select flags:", &taxonomy.flags)?;
    entry.tags = session.select_many("Select tags:", &taxonomy.tags)?;
    entry.resources = prompt_resources(session, taxonomy)?;
    Ok(entry)
}

/// Run the staging flow and write the result. Returns the entry and its file.
pub fn stage_entry<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    taxonomy: &Taxonomy,
    staging_dir: &Path,
) -> Result<(Entry, PathBuf), StageError> {
    let entry = prompt_entry(session, taxonomy, staging_dir)?;
    session.say("New entry created:")?;
    session.say(&staging::staged_json(&entry)?)?;
    let path = staging::write_staged(staging_dir, &entry)?;
    info!(title = %entry.title, path = %path.display(), "entry staged");
    Ok((entry, path))
}
