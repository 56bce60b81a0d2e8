use anyhow::{anyhow, Context, Result};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::models::{PageStatus, RewriteStats};

/// Sidebar widgets the exported pages should not keep.
const UNWANTED_ASIDE_IDS: [&str; 2] = ["search-2", "meta-2"];
/// Script id prefixes injected by WordPress plugins.
const UNWANTED_SCRIPT_PREFIXES: [&str; 3] = ["jetpack-", "sharing-js", "comment-reply"];

/// Outcome of rewriting one document in memory.
pub enum Rewrite {
    /// The serialized document plus a tally of what was stripped.
    Changed { html: String, stats: RewriteStats },
    /// The page lacks one of the two landmark sections and is left untouched.
    MissingSection(&'static str),
}

/// Whether `process_page` writes anything back to disk.
#[derive(Debug, Clone, Copy)]
pub struct WritePolicy {
    pub execute: bool,
    pub backup: bool,
}

/// Moves the `#sidebar` section directly after the `#content` section and
/// strips the scripts, iframes, share widgets and stray asides that WordPress
/// exports leave behind.
pub fn move_sidebar(document: &str) -> Result<Rewrite> {
    let mut html = Html::parse_document(document);

    let content_id = match find_by_id(&html, "content")? {
        Some(id) => id,
        None => return Ok(Rewrite::MissingSection("content")),
    };
    let sidebar_id = match find_by_id(&html, "sidebar")? {
        Some(id) => id,
        None => return Ok(Rewrite::MissingSection("sidebar")),
    };
    if is_ancestor_of(&html, sidebar_id, content_id) {
        return Err(anyhow!("the sidebar section contains the content section"));
    }

    let stats = RewriteStats {
        scripts: strip_scripts(&mut html)?,
        iframes: strip_likes_iframe(&mut html)?,
        share_divs: strip_share_divs(&mut html)?,
        ..RewriteStats::default()
    };
    let (unwanted_asides, duplicate_asides) = strip_sidebar_asides(&mut html, sidebar_id)?;
    let stats = RewriteStats {
        unwanted_asides,
        duplicate_asides,
        ..stats
    };

    html.tree
        .get_mut(sidebar_id)
        .ok_or_else(|| anyhow!("sidebar section vanished during rewrite"))?
        .detach();
    html.tree
        .get_mut(content_id)
        .ok_or_else(|| anyhow!("content section vanished during rewrite"))?
        .insert_id_after(sidebar_id);

    Ok(Rewrite::Changed {
        html: html.html(),
        stats,
    })
}

/// Applies `move_sidebar` to a file on disk. Failures stay per-page.
pub fn process_page(path: &Path, policy: WritePolicy) -> PageStatus {
    match rewrite_file(path, policy) {
        Ok(status) => status,
        Err(err) => PageStatus::Failed(format!("{:#}", err)),
    }
}

fn rewrite_file(path: &Path, policy: WritePolicy) -> Result<PageStatus> {
    let original = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    match move_sidebar(&original)? {
        Rewrite::MissingSection(which) => Ok(PageStatus::Skipped(format!(
            "no element with id {:?}",
            which
        ))),
        Rewrite::Changed { html, stats } => {
            if policy.execute {
                if policy.backup {
                    let backup = backup_path(path);
                    fs::copy(path, &backup)
                        .with_context(|| format!("failed to back up {}", path.display()))?;
                }
                fs::write(path, html)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            Ok(PageStatus::Moved(stats))
        }
    }
}

/// `page.html` becomes `page.html.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {:?}: {}", css, err))
}

fn find_by_id(html: &Html, id: &str) -> Result<Option<NodeId>> {
    let selector = parse_selector(&format!("#{}", id))?;
    Ok(html.select(&selector).next().map(|el| el.id()))
}

fn is_ancestor_of(html: &Html, ancestor: NodeId, node: NodeId) -> bool {
    html.tree
        .get(node)
        .map_or(false, |n| n.ancestors().any(|a| a.id() == ancestor))
}

fn detach_all(html: &mut Html, ids: &[NodeId]) {
    for &id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Removes plugin scripts: jetpack-*, sharing-js*, comment-reply* ids and
/// `type="speculationrules"` blocks.
fn strip_scripts(html: &mut Html) -> Result<usize> {
    let selector = parse_selector("script")?;
    let doomed: Vec<NodeId> = html
        .select(&selector)
        .filter(|el| {
            let value = el.value();
            let unwanted_id = value.attr("id").map_or(false, |id| {
                UNWANTED_SCRIPT_PREFIXES
                    .iter()
                    .any(|prefix| id.starts_with(prefix))
            });
            unwanted_id || value.attr("type") == Some("speculationrules")
        })
        .map(|el| el.id())
        .collect();

    detach_all(html, &doomed);
    Ok(doomed.len())
}

/// Removes the WordPress.com likes iframe, if present.
fn strip_likes_iframe(html: &mut Html) -> Result<usize> {
    let selector = parse_selector("iframe#likes-master")?;
    let found = html.select(&selector).next().map(|el| el.id());
    match found {
        Some(id) => {
            detach_all(html, &[id]);
            Ok(1)
        }
        None => Ok(0),
    }
}

/// Removes divs carrying any class token that starts with `sharedaddy`.
fn strip_share_divs(html: &mut Html) -> Result<usize> {
    let selector = parse_selector("div")?;
    let doomed: Vec<NodeId> = html
        .select(&selector)
        .filter(|el| {
            el.value()
                .classes()
                .any(|class| class.starts_with("sharedaddy"))
        })
        .map(|el| el.id())
        .collect();

    detach_all(html, &doomed);
    Ok(doomed.len())
}

/// Inside the sidebar: drops asides with an unwanted id, and asides whose id
/// repeats an earlier one (the first occurrence stays).
fn strip_sidebar_asides(html: &mut Html, sidebar_id: NodeId) -> Result<(usize, usize)> {
    let selector = parse_selector("aside[id]")?;

    let (unwanted, duplicates) = {
        let sidebar = html
            .tree
            .get(sidebar_id)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| anyhow!("sidebar section vanished during rewrite"))?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut unwanted = Vec::new();
        let mut duplicates = Vec::new();
        for aside in sidebar.select(&selector) {
            let Some(id) = aside.value().attr("id") else {
                continue;
            };
            if UNWANTED_ASIDE_IDS.contains(&id) {
                unwanted.push(aside.id());
            } else if !seen.insert(id) {
                duplicates.push(aside.id());
            }
        }
        (unwanted, duplicates)
    };

    detach_all(html, &unwanted);
    detach_all(html, &duplicates);
    Ok((unwanted.len(), duplicates.len()))
}
