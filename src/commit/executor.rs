//! Stage everything and create the commit.

use std::path::Path;

use crate::error::GitError;
use crate::git::Vcs;

/// Stage all working-tree changes and commit them with `message` as-is.
pub fn stage_and_commit<V: Vcs + ?Sized>(
    vcs: &V,
    root: &Path,
    message: &str,
) -> Result<(), GitError> {
    vcs.stage_all(root)?;
    vcs.commit(root, message)
}
