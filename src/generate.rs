//! HTML page generation.
//!
//! Final stage of the pipeline. Takes the store entries and the topic index
//! and renders one static page grouping entries by topic and subtopic.
//!
//! ## Page Structure
//!
//! ```text
//! header          site title, description, entry count, last update
//! nav.toc         one link per populated topic
//! section#topic-dev
//!   entries paired with "Dev" and no subtopic
//!   section#topic-dev-cli
//!     entries paired with "Dev" / "CLI"
//! ```
//!
//! ## Entry Cards
//!
//! Each card carries a header block colored from the title (see
//! [`title_color`]), a `new` badge, type/subtype badges, flag and tag badges
//! (omitted when empty), the description, a call-to-action button for the
//! first resource and a button group for the rest. Button colors, icons and
//! labels come from the resource kinds in the taxonomy.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All entry text is escaped. The rendered document is checked by
//! [`crate::html::validate`] and indented by [`crate::html::prettify`] before it
//! is written; check findings are logged and never block the write.

use crate::assets::{self, AssetError, AssetReport};
use crate::config::{ProjectPaths, RenderConfig, SiteConfig, TreasuresConfig};
use crate::html::{self, Issue, Rules, Severity};
use crate::store::{self, StoreError};
use crate::taxonomy::{Taxonomy, TaxonomyError};
use crate::topics::{TopicIndex, TopicNode, UnresolvedTopic};
use crate::types::{Entry, Resource};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

const FALLBACK_RESOURCE_COLOR: &str = "#6c757d";
const FALLBACK_RESOURCE_ICON: &str = "bi-link-45deg";

// ============================================================================
// Title colors
// ============================================================================

/// 24-bit RGB color derived from a title.
///
/// `h = h * 31 + u` over the title's UTF-16 code units with wrapping 32-bit
/// arithmetic, keeping the low 24 bits. Code units rather than chars, so titles
/// outside the BMP get the colors browsers computed for the published page.
pub fn title_color(title: &str) -> u32 {
    let hash = title
        .encode_utf16()
        .fold(0u32, |h, u| h.wrapping_mul(31).wrapping_add(u32::from(u)));
    hash & 0xFF_FFFF
}

/// Bitwise complement within 24 bits.
pub fn complement(color: u32) -> u32 {
    !color & 0xFF_FFFF
}

pub fn hex_color(color: u32) -> String {
    format!("#{:06x}", color & 0xFF_FFFF)
}

/// Header background and text colors for a title, as CSS hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleColors {
    pub background: String,
    pub text: String,
}

pub fn title_colors(title: &str) -> TitleColors {
    let color = title_color(title);
    TitleColors {
        background: hex_color(color),
        text: hex_color(complement(color)),
    }
}

// ============================================================================
// Resource display
// ============================================================================

/// How a resource button looks: from its taxonomy kind, or a neutral fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStyle<'a> {
    pub color: &'a str,
    pub icon: &'a str,
    pub label: &'a str,
}

pub fn resource_style<'a>(resource: &'a Resource, taxonomy: &'a Taxonomy) -> ResourceStyle<'a> {
    match taxonomy.resource_kind(&resource.name) {
        Some(kind) => ResourceStyle {
            color: &kind.color,
            icon: if kind.icon.is_empty() {
                FALLBACK_RESOURCE_ICON
            } else {
                &kind.icon
            },
            label: kind.display_label(),
        },
        None => ResourceStyle {
            color: FALLBACK_RESOURCE_COLOR,
            icon: FALLBACK_RESOURCE_ICON,
            label: &resource.name,
        },
    }
}

/// Anchor id for a topic or subtopic: lowercase ASCII, runs of anything else
/// become one dash.
pub fn anchor_id(parts: &[&str]) -> String {
    let mut id = String::from("topic");
    for part in parts {
        id.push('-');
        let mut prev_dash = true;
        for c in part.chars() {
            if c.is_ascii_alphanumeric() {
                id.push(c.to_ascii_lowercase());
                prev_dash = false;
            } else if !prev_dash {
                id.push('-');
                prev_dash = true;
            }
        }
        while id.ends_with('-') {
            id.pop();
        }
    }
    id
}

/// Anchor ids for one populated topic and its populated subtopics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAnchors {
    pub id: String,
    pub subtopics: Vec<String>,
}

/// Anchor ids for every populated topic, in page order.
///
/// Names that slug to the same id ("C++" and "C#") get `-2`, `-3`, ... in
/// order of appearance, so every id on the page is unique.
pub fn page_anchors(index: &TopicIndex<'_>) -> Vec<TopicAnchors> {
    let mut taken = HashSet::new();
    index
        .populated()
        .map(|topic| {
            let id = unique_id(&mut taken, anchor_id(&[topic.name.as_str()]));
            let subtopics = topic
                .subtopics
                .iter()
                .filter(|s| !s.entries.is_empty())
                .map(|sub| {
                    unique_id(
                        &mut taken,
                        anchor_id(&[topic.name.as_str(), sub.name.as_str()]),
                    )
                })
                .collect();
            TopicAnchors { id, subtopics }
        })
        .collect()
}

fn unique_id(taken: &mut HashSet<String>, base: String) -> String {
    let mut id = base.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    taken.insert(id.clone());
    id
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(site: &SiteConfig, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(site.description);
                title { (site.title) }
                @for href in &site.stylesheets {
                    link rel="stylesheet" href=(href);
                }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                @for src in &site.scripts {
                    script src=(src) {}
                }
            }
        }
    }
}

/// Renders the page header with title, description and counts
fn site_header(site: &SiteConfig, entries: &[Entry]) -> Markup {
    let last_update = entries.iter().filter_map(|e| e.date).max();
    html! {
        header.site-header {
            h1 { (site.title) }
            @if !site.description.is_empty() {
                p.lead { (site.description) }
            }
            p.site-stats {
                (entries.len()) " treasures"
                @if let Some(date) = last_update {
                    " · last updated "
                    time datetime=(date.to_rfc3339()) { (date.format("%Y-%m-%d").to_string()) }
                }
            }
        }
    }
}

/// Renders the table of contents linking each populated topic
fn render_toc(index: &TopicIndex<'_>, anchors: &[TopicAnchors]) -> Markup {
    html! {
        nav.toc {
            ul {
                @for (topic, anchor) in index.populated().zip(anchors) {
                    li {
                        a href={ "#" (anchor.id) } { (topic.name) }
                        " "
                        span.toc-count { (topic.placement_count()) }
                    }
                }
            }
        }
    }
}

fn badge(class: &str, text: &str) -> Markup {
    html! {
        span class={ "badge " (class) } { (text) }
    }
}

/// Renders a resource as a button link
fn resource_button(resource: &Resource, taxonomy: &Taxonomy, class: &str) -> Markup {
    let style = resource_style(resource, taxonomy);
    html! {
        a class={ "btn " (class) } href=(resource.payload) target="_blank" rel="noopener"
            style={ "background-color: " (style.color) "; border-color: " (style.color) ";" } {
            i class={ "bi " (style.icon) } {}
            " " (style.label)
        }
    }
}

/// Renders one entry card
pub fn render_entry(entry: &Entry, taxonomy: &Taxonomy) -> Markup {
    let colors = title_colors(&entry.title);
    let classification = &entry.data.classification;
    let flags: Vec<&str> = entry.display_flags().collect();
    let secondary = entry.secondary_resources();

    html! {
        article.card.treasure {
            div.treasure-header style={ "background-color: " (colors.background) "; color: " (colors.text) ";" } {
                span.treasure-header-title { (entry.title) }
            }
            div.card-body {
                h3.card-title {
                    (entry.title)
                    @if entry.is_new() {
                        " " (badge("text-bg-success badge-new", "new"))
                    }
                }
                div.treasure-types {
                    (badge("text-bg-primary", &classification.kind))
                    @if !classification.subtype.is_empty() {
                        " " (badge("text-bg-secondary", &classification.subtype))
                    }
                }
                @if !flags.is_empty() {
                    div.treasure-flags {
                        @for flag in &flags {
                            (badge("text-bg-warning", flag)) " "
                        }
                    }
                }
                @if !entry.tags.is_empty() {
                    div.treasure-tags {
                        @for tag in &entry.tags {
                            span.badge.text-bg-light { "#" (tag) } " "
                        }
                    }
                }
                @if !entry.description.is_empty() {
                    p.card-text { (entry.description) }
                }
                @if let Some(primary) = entry.primary_resource() {
                    (resource_button(primary, taxonomy, "treasure-cta"))
                }
                @if !secondary.is_empty() {
                    div.btn-group.treasure-more role="group" aria-label="More links" {
                        @for resource in secondary {
                            (resource_button(resource, taxonomy, "btn-sm"))
                        }
                    }
                }
            }
        }
    }
}

fn render_entry_grid(entries: &[&Entry], taxonomy: &Taxonomy) -> Markup {
    html! {
        div.treasure-grid {
            @for entry in entries {
                (render_entry(entry, taxonomy))
            }
        }
    }
}

/// Renders a topic section with its top-level entries and subtopic sections
fn render_topic(topic: &TopicNode<'_>, anchors: &TopicAnchors, taxonomy: &Taxonomy) -> Markup {
    let subtopics = topic.subtopics.iter().filter(|s| !s.entries.is_empty());
    html! {
        section.topic id=(anchors.id) {
            h2 { (topic.name) }
            @if !topic.entries.is_empty() {
                (render_entry_grid(&topic.entries, taxonomy))
            }
            @for (sub, id) in subtopics.zip(&anchors.subtopics) {
                section.subtopic id=(id) {
                    h3.subtopic-title { (sub.name) }
                    (render_entry_grid(&sub.entries, taxonomy))
                }
            }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

/// Renders the whole page. Pure: same inputs, same output.
pub fn render_page(
    entries: &[Entry],
    index: &TopicIndex<'_>,
    taxonomy: &Taxonomy,
    site: &SiteConfig,
) -> Markup {
    let anchors = page_anchors(index);
    let content = html! {
        (site_header(site, entries))
        (render_toc(index, &anchors))
        main.treasures {
            @for (topic, topic_anchors) in index.populated().zip(&anchors) {
                (render_topic(topic, topic_anchors, taxonomy))
            }
        }
    };
    base_document(site, CSS_STATIC, content)
}

/// Per-topic placement counts, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub name: String,
    pub direct: usize,
    pub subtopics: Vec<(String, usize)>,
}

/// What a generation pass produced.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    pub output: PathBuf,
    pub entries: usize,
    pub topics: Vec<TopicSummary>,
    pub unresolved: Vec<UnresolvedTopic>,
    pub issues: Vec<Issue>,
    pub assets: AssetReport,
}

/// The finished document and what went into it.
#[derive(Debug, Clone)]
pub struct RenderedSite {
    pub html: String,
    pub topics: Vec<TopicSummary>,
    pub unresolved: Vec<UnresolvedTopic>,
    pub issues: Vec<Issue>,
}

/// Index, render, check and indent. No I/O.
pub fn render_site(
    entries: &[Entry],
    taxonomy: &Taxonomy,
    site: &SiteConfig,
    render: &RenderConfig,
) -> RenderedSite {
    let index = TopicIndex::build(&taxonomy.topics, entries);
    let raw = render_page(entries, &index, taxonomy, site).into_string();

    let issues = if render.validate {
        html::validate(&raw, Rules::default())
    } else {
        Vec::new()
    };
    let html = if render.pretty { html::prettify(&raw) } else { raw };

    let topics = index
        .populated()
        .map(|t| TopicSummary {
            name: t.name.clone(),
            direct: t.entries.len(),
            subtopics: t
                .subtopics
                .iter()
                .filter(|s| !s.entries.is_empty())
                .map(|s| (s.name.clone(), s.entries.len()))
                .collect(),
        })
        .collect();

    RenderedSite {
        html,
        topics,
        unresolved: index.unresolved,
        issues,
    }
}

/// Render `entries` and write the page to `output`.
pub fn write_site(
    entries: &[Entry],
    taxonomy: &Taxonomy,
    config: &TreasuresConfig,
    output: &Path,
) -> Result<GenerateSummary, GenerateError> {
    let site = render_site(entries, taxonomy, &config.site, &config.render);

    for unresolved in &site.unresolved {
        warn!("skipped pairing: {unresolved}");
    }
    for issue in &site.issues {
        match issue.severity {
            Severity::Error => error!(line = issue.line, column = issue.column, "{}", issue.message),
            Severity::Warning => warn!(line = issue.line, column = issue.column, "{}", issue.message),
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &site.html)?;
    info!(output = %output.display(), entries = entries.len(), "page written");

    Ok(GenerateSummary {
        output: output.to_path_buf(),
        entries: entries.len(),
        topics: site.topics,
        unresolved: site.unresolved,
        issues: site.issues,
        assets: AssetReport::default(),
    })
}

/// Load the store and taxonomy, write the page, then copy the site assets.
pub fn generate(
    paths: &ProjectPaths,
    config: &TreasuresConfig,
) -> Result<GenerateSummary, GenerateError> {
    let taxonomy = Taxonomy::load(&paths.data_dir)?;
    let entries = store::load_store(&paths.store)?;
    let mut summary = write_site(&entries, &taxonomy, config, &paths.output)?;
    summary.assets = assets::copy_assets(&paths.root, &config.site.assets, &paths.assets_dir)?;
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================
