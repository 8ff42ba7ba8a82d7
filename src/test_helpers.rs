//! Shared test utilities for the treasures test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let paths = fixture_paths(&tmp);
//! let entries = store::load_store(&paths.store).unwrap();
//!
//! let ripgrep = find_entry(&entries, "ripgrep");
//! assert!(ripgrep.is_new());
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::{PathsConfig, ProjectPaths};
use crate::types::Entry;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// The copy holds a `sources/` data directory with taxonomy files, a store
/// and a staging area. Tests can mutate it freely.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Default project layout rooted at a fixture copy.
pub fn fixture_paths(tmp: &TempDir) -> ProjectPaths {
    ProjectPaths::resolve(tmp.path(), &PathsConfig::default())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Entry lookups, panic with a clear message on miss
// =========================================================================

/// Find an entry by title. Panics if not found.
pub fn find_entry<'a>(entries: &'a [Entry], title: &str) -> &'a Entry {
    entries.iter().find(|e| e.title == title).unwrap_or_else(|| {
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        panic!("entry '{title}' not found. Available: {titles:?}")
    })
}

/// Titles in slice order.
pub fn entry_titles(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.title.as_str()).collect()
}
