//! Front-end assets copied next to the generated page.
//!
//! The page links its stylesheets and scripts relative to the output file.
//! Each configured source (a file or a directory, usually inside an installed
//! `node_modules/`) lands in the assets directory under the name of the
//! package it came from:
//!
//! ```text
//! node_modules/bootstrap/dist/css/bootstrap.min.css  →  docs/assets/bootstrap/bootstrap.min.css
//! node_modules/bootstrap-icons/font/fonts/           →  docs/assets/bootstrap-icons/fonts/
//! vendor/logo.svg                                    →  docs/assets/logo.svg
//! ```
//!
//! A source that doesn't exist is skipped and reported, so a checkout without
//! its front-end packages installed still builds the page.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot copy asset {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// What an asset pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// The assets directory.
    pub dir: PathBuf,
    /// Files written, in copy order.
    pub copied: Vec<PathBuf>,
    /// Configured sources that don't exist.
    pub missing: Vec<PathBuf>,
}

/// Where `source` lands inside `assets_dir`.
///
/// Sources inside `node_modules/<package>/` go to `<package>/<name>`; a source
/// that is the package directory itself goes to `<package>`. Anything else
/// goes to `<name>`.
pub fn asset_target(assets_dir: &Path, source: &Path) -> PathBuf {
    let parts: Vec<&OsStr> = source.components().map(|c| c.as_os_str()).collect();
    let mut target = assets_dir.to_path_buf();
    match parts.iter().position(|p| *p == "node_modules") {
        Some(i) if i + 1 < parts.len() => {
            target.push(parts[i + 1]);
            if i + 2 < parts.len() {
                target.push(parts[parts.len() - 1]);
            }
        }
        _ => {
            if let Some(name) = source.file_name() {
                target.push(name);
            }
        }
    }
    target
}

/// Copy every source, relative to `root` unless absolute, into `assets_dir`.
pub fn copy_assets(
    root: &Path,
    sources: &[String],
    assets_dir: &Path,
) -> Result<AssetReport, AssetError> {
    let mut report = AssetReport {
        dir: assets_dir.to_path_buf(),
        ..Default::default()
    };
    for source in sources {
        let relative = Path::new(source);
        let from = root.join(relative);
        if !from.exists() {
            warn!(asset = %from.display(), "asset not found, skipping");
            report.missing.push(from);
            continue;
        }
        let to = asset_target(assets_dir, relative);
        let copied = if from.is_dir() {
            copy_dir_recursive(&from, &to, &mut report.copied)
        } else {
            copy_file(&from, &to, &mut report.copied)
        };
        copied.map_err(|source| AssetError::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        debug!(from = %from.display(), to = %to.display(), "asset copied");
    }
    Ok(report)
}

fn copy_file(src: &Path, dst: &Path, copied: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    copied.push(dst.to_path_buf());
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path, copied: &mut Vec<PathBuf>) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    let mut entries = fs::read_dir(src)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path, copied)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied.push(dst_path);
        }
    }
    Ok(())
}
