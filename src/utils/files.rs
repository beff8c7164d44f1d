//! Work-list resolution
//!
//! Turns command-line paths into the ordered, duplicate-free list of files
//! handed to the dispatcher.

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expand `paths` into source files.
///
/// Files are kept as given. Directories are walked (honoring ignore files)
/// and filtered by the `include` globs, matched against file names.
pub fn resolve_work_list(paths: &[PathBuf], include: &[String]) -> Result<Vec<String>> {
    let globs = build_globset(include)?;
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let mut push = |path: &Path| {
        let path = path.to_string_lossy().into_owned();
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for path in paths {
        if path.is_file() {
            push(path);
        } else if path.is_dir() {
            let walker = WalkBuilder::new(path)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Walk error: {}", e);
                        continue;
                    }
                };
                let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                if is_file && globs.is_match(entry.file_name()) {
                    push(entry.path());
                }
            }
        } else {
            bail!("Path not found: {}", path.display());
        }
    }

    tracing::debug!("Resolved {} files from {} paths", files.len(), paths.len());
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid glob '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build file globs")
}
