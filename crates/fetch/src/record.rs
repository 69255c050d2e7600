//! The per-owner `github_address.txt` record of downloaded URLs.
//!
//! The record is kept minimal: a URL already covered by a recorded parent
//! is not added, and sibling URLs sharing a parent collapse into that
//! parent.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const ADDRESS_FILE: &str = "github_address.txt";

fn is_parent_of(parent: &str, child: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn parent_url(url: &str) -> &str {
    url.rsplit_once('/').map_or(url, |(parent, _)| parent)
}

/// Computes the new record after adding `url` to `existing`.
///
/// Returns `None` when the record does not change, either because `url` is
/// already covered or because merging yields the same set. Otherwise the
/// result is sorted.
pub fn merge_recorded_urls(existing: &[String], url: &str) -> Option<Vec<String>> {
    let url = url.trim_end_matches('/');
    if existing
        .iter()
        .any(|ex| ex == url || is_parent_of(ex, url))
    {
        return None;
    }

    let mut current: BTreeSet<String> = existing.iter().cloned().collect();
    current.insert(url.to_string());

    loop {
        let roots: Vec<&String> = current
            .iter()
            .filter(|u| !current.iter().any(|other| other != *u && is_parent_of(other, u)))
            .collect();

        let mut groups: BTreeMap<&str, Vec<&String>> = BTreeMap::new();
        for &u in &roots {
            groups.entry(parent_url(u)).or_default().push(u);
        }

        let mut changed = false;
        let mut next = BTreeSet::new();
        for (parent, children) in groups {
            if children.len() > 1 {
                next.insert(parent.to_string());
                changed = true;
            } else {
                next.extend(children.into_iter().cloned());
            }
        }
        current = next;
        if !changed {
            break;
        }
    }

    let merged: Vec<String> = current.into_iter().collect();
    let mut before = existing.to_vec();
    before.sort();
    (merged != before).then_some(merged)
}

/// Adds `url` to `owner_dir/github_address.txt`, rewriting the file only
/// when the merged record differs. Returns whether the file was written.
pub fn record_address(owner_dir: &Path, url: &str) -> Result<bool> {
    std::fs::create_dir_all(owner_dir)
        .with_context(|| format!("creating {}", owner_dir.display()))?;
    let file = owner_dir.join(ADDRESS_FILE);
    let existing: Vec<String> = match std::fs::read_to_string(&file) {
        Ok(text) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(err).with_context(|| format!("reading {}", file.display())),
    };

    let Some(merged) = merge_recorded_urls(&existing, url) else {
        tracing::debug!(url, "address already recorded");
        return Ok(false);
    };
    let mut text = merged.join("\n");
    text.push('\n');
    std::fs::write(&file, text).with_context(|| format!("writing {}", file.display()))?;
    tracing::info!(path = %file.display(), "address record updated");
    Ok(true)
}
