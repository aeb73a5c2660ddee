use anyhow::{Context, Result};
use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Path, PathBuf};

/// Include/exclude globs, gitignore syntax, relative to the scanned root.
/// No includes means every file.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Root-relative paths of every file under `root` accepted by `filter`, sorted.
pub fn list_matched_relative_paths(root: &Path, filter: &PathFilter) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .overrides(build_overrides(root, filter)?)
        .build();

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan: {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        paths.push(relative.to_path_buf());
    }

    paths.sort();
    Ok(paths)
}

fn build_overrides(root: &Path, filter: &PathFilter) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);
    for glob in &filter.includes {
        builder
            .add(glob)
            .with_context(|| format!("Invalid include pattern: {glob}"))?;
    }
    for glob in &filter.excludes {
        builder
            .add(&format!("!{glob}"))
            .with_context(|| format!("Invalid exclude pattern: {glob}"))?;
    }
    builder.build().context("Failed to build path filter")
}
