//! Pending-change collection for the working tree.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::GitError;
use crate::git::client::Vcs;

/// Porcelain status prefix for untracked entries.
const UNTRACKED_PREFIX: &str = "??";

/// Changes found in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChanges {
    /// Status listing, one entry per line.
    pub status: String,
    /// Unified diff of the changes.
    pub diff: String,
}

/// Collect pending changes under `root`.
///
/// Returns `Ok(None)` when there is nothing to commit: an empty status
/// listing, or a diff that comes back empty. With `read_only` set the index
/// is never written; untracked files are diffed against an empty baseline
/// instead of going through `add -N` and `reset`.
pub fn collect_changes<V: Vcs + ?Sized>(
    vcs: &V,
    root: &Path,
    read_only: bool,
) -> Result<Option<PendingChanges>, GitError> {
    if vcs.is_repo_root(root) {
        collect_tracked(vcs, root, read_only)
    } else {
        collect_unversioned(vcs, root)
    }
}

fn collect_tracked<V: Vcs + ?Sized>(
    vcs: &V,
    root: &Path,
    read_only: bool,
) -> Result<Option<PendingChanges>, GitError> {
    let status = vcs.status(root)?;
    if status.trim().is_empty() {
        return Ok(None);
    }

    let diff = if !has_untracked(&status) {
        vcs.diff(root)?
    } else if read_only {
        diff_without_index(vcs, root)?
    } else {
        vcs.intent_to_add_all(root)?;
        let diff = vcs.diff(root);
        // Always drop the intent-to-add entries, even if the diff failed.
        let reset = vcs.reset(root);
        let diff = diff?;
        reset?;
        diff
    };

    if diff.trim().is_empty() {
        debug!("Status listed changes but the diff is empty");
        return Ok(None);
    }

    Ok(Some(PendingChanges { status, diff }))
}

/// Tracked diff followed by a full-content diff of every untracked file.
fn diff_without_index<V: Vcs + ?Sized>(vcs: &V, root: &Path) -> Result<String, GitError> {
    let mut diff = vcs.diff(root)?;
    for file in vcs.untracked_files(root)? {
        if !diff.is_empty() && !diff.ends_with('\n') {
            diff.push('\n');
        }
        diff.push_str(&vcs.diff_against_empty(root, &file)?);
    }
    Ok(diff.trim().to_string())
}

fn collect_unversioned<V: Vcs + ?Sized>(
    vcs: &V,
    root: &Path,
) -> Result<Option<PendingChanges>, GitError> {
    let entries = visible_entries(root)?;
    if entries.is_empty() {
        return Ok(None);
    }

    let status = entries
        .iter()
        .map(|name| format!("{UNTRACKED_PREFIX} {name}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut diff = String::new();
    for entry in &entries {
        let walk = WalkDir::new(root.join(entry))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));
        for file in walk {
            let file = file.map_err(|e| GitError::ListEntries(e.to_string()))?;
            if !file.file_type().is_file() {
                continue;
            }
            let relative = file.path().strip_prefix(root).unwrap_or(file.path());
            diff.push_str(&vcs.diff_against_empty(root, relative)?);
        }
    }

    let diff = diff.trim().to_string();
    if diff.is_empty() {
        return Ok(None);
    }

    Ok(Some(PendingChanges { status, diff }))
}

/// Non-hidden top-level entry names of `root`, sorted.
fn visible_entries(root: &Path) -> Result<Vec<String>, GitError> {
    let read_dir = std::fs::read_dir(root).map_err(|e| GitError::ListEntries(e.to_string()))?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| GitError::ListEntries(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_hidden(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

fn has_untracked(status: &str) -> bool {
    status
        .lines()
        .any(|line| line.starts_with(UNTRACKED_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(".git"));
        assert!(is_hidden(".env"));
        assert!(is_hidden("__pycache__"));
        assert!(!is_hidden("src"));
        assert!(!is_hidden("_config.yml"));
    }

    #[test]
    fn test_has_untracked() {
        assert!(has_untracked(" M src/lib.rs\n?? notes.txt"));
        assert!(!has_untracked(" M src/lib.rs\nA  new.rs"));
        assert!(!has_untracked(""));
    }

    #[test]
    fn test_visible_entries_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join(".hidden"), "h").unwrap();
        std::fs::create_dir(dir.path().join("__cache__")).unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let entries = visible_entries(dir.path()).unwrap();
        assert_eq!(entries, vec!["a.txt", "b.txt", "src"]);
    }
}
