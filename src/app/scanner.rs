use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Recursive page discovery under a fixed root.
///
/// The walk behaves like `find`: hidden directories are traversed and no
/// ignore files are consulted, so every page of an export is seen. Only
/// regular files count; directories or symlinks that happen to carry a
/// matching name are passed over.
pub struct Scanner {
    root: PathBuf,
    target: GlobSet,
}

impl Scanner {
    /// Matches every file named exactly `index.html`, at any depth.
    pub fn index_pages(root: PathBuf) -> Result<Self> {
        Self::new(root, &["**/index.html"])
    }

    /// Matches every file with an `.html` extension, at any depth.
    pub fn html_pages(root: PathBuf) -> Result<Self> {
        Self::new(root, &["**/*.html"])
    }

    fn new(root: PathBuf, patterns: &[&str]) -> Result<Self> {
        Ok(Self {
            root,
            target: build_globset(patterns)?,
        })
    }

    /// Walks the tree and returns the matching paths, sorted.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut pages = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().map_or(false, |t| t.is_file()) {
                        continue;
                    }
                    if self.matches(entry.path()) {
                        pages.push(entry.path().to_path_buf());
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        // Traversal order is platform-dependent; sort so runs are reproducible.
        pages.sort();
        pages
    }

    fn matches(&self, path: &Path) -> bool {
        match diff_paths(path, &self.root) {
            Some(relative) => self.target.is_match(&relative),
            None => false,
        }
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}
