//! # Treasures
//!
//! A personal curated-links manager and static page generator. Entries
//! describing links worth keeping are staged interactively, integrated into a
//! canonical JSON store, and rendered to a single HTML page grouped by topic
//! and subtopic.
//!
//! # Architecture: Stage, Integrate, Render
//!
//! ```text
//! 1. Stage      prompts        →  sources/to_integrate/<title>.json
//! 2. Integrate  staged + store →  sources/treasures.json
//! 3. Render     store          →  docs/index.html, docs/assets/
//! ```
//!
//! Each step reads and writes plain JSON or HTML, so any intermediate state can
//! be inspected or fixed by hand. Integration always ends with a render, so the
//! page never lags behind the store.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Entry data model and the on-disk envelopes |
//! | [`taxonomy`] | Reference lists (types, topics, flags, tags, resource kinds) and store checks |
//! | [`store`] | Load and save the title-keyed entry store |
//! | [`staging`] | Read, write and delete staged entry files |
//! | [`integrate`] | Merge staged entries into the store |
//! | [`topics`] | Group entries by topic and subtopic for rendering |
//! | [`generate`] | Render the page with Maud and write it |
//! | [`assets`] | Copy front-end packages next to the page |
//! | [`html`] | Structural validation and pretty-printing of the generated HTML |
//! | [`prompt`] | Line-based terminal prompts over any reader/writer pair |
//! | [`stage`] | The interactive menu and staging flow |
//! | [`config`] | `treasures.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Title as Key
//!
//! The store is a JSON object keyed by entry title, written in
//! case-insensitive title order. Staging a title that already exists and
//! integrating it replaces the stored entry, which is how entries get updated.
//!
//! ## Deterministic Output
//!
//! Rendering is a pure function of the store, the taxonomy and the config. The
//! page carries no build timestamp, so regenerating an unchanged store gives a
//! byte-identical file and a quiet diff.
//!
//! ## Maud Over String Templates
//!
//! HTML is built with [Maud](https://maud.lambda.xyz/). All interpolated text
//! is escaped, so titles and descriptions can hold any characters.
//!
//! ## Lenient Batches, Strict Store
//!
//! A malformed staged file is skipped and reported; the rest of the batch still
//! integrates. A store that can't be parsed stops integration before anything
//! is written or deleted.

pub mod assets;
pub mod config;
pub mod generate;
pub mod html;
pub mod integrate;
pub mod output;
pub mod prompt;
pub mod stage;
pub mod staging;
pub mod store;
pub mod taxonomy;
pub mod topics;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
