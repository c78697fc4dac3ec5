//! Repository discovery and on-demand initialization.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::confirm::Confirmer;
use crate::error::AutocommitError;
use crate::git::client::Vcs;

/// Result of locating the repository for the current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoLocation {
    /// A repository root already exists.
    Existing(PathBuf),
    /// The operator agreed and a new repository was created.
    Initialized(PathBuf),
    /// No repository, and initialization was not offered.
    Unversioned(PathBuf),
    /// The operator declined initialization.
    Declined,
}

impl RepoLocation {
    /// Directory the remaining stages run in, if the run continues.
    pub fn root(&self) -> Option<&Path> {
        match self {
            RepoLocation::Existing(p)
            | RepoLocation::Initialized(p)
            | RepoLocation::Unversioned(p) => Some(p),
            RepoLocation::Declined => None,
        }
    }
}

/// Resolve the repository root for `cwd`, offering to initialize one.
///
/// Falls back to `cwd` itself when git cannot resolve an enclosing root.
/// When `offer_init` is false a directory without a marker is returned as
/// [`RepoLocation::Unversioned`] and nothing is asked.
pub fn locate_repository<V, C>(
    vcs: &V,
    confirmer: &C,
    config: &Config,
    cwd: &Path,
    offer_init: bool,
) -> Result<RepoLocation, AutocommitError>
where
    V: Vcs + ?Sized,
    C: Confirmer + ?Sized,
{
    let root = match vcs.toplevel(cwd) {
        Ok(root) => root,
        Err(e) => {
            debug!("No enclosing repository ({}), using {}", e, cwd.display());
            cwd.to_path_buf()
        }
    };

    println!("Current directory: {}", root.display());

    if vcs.is_repo_root(&root) {
        return Ok(RepoLocation::Existing(root));
    }

    if !offer_init {
        return Ok(RepoLocation::Unversioned(root));
    }

    let accepted =
        confirmer.confirm("Not a git repository. Initialize a git project here?")?;
    if !accepted {
        println!("Operation cancelled.");
        return Ok(RepoLocation::Declined);
    }

    vcs.init(&root).map_err(AutocommitError::InitFailed)?;
    vcs.set_identity(&root, &config.user_name, &config.user_email)
        .map_err(AutocommitError::InitFailed)?;

    let project = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());
    println!("Git repository initialized for project: {}", project);

    Ok(RepoLocation::Initialized(root))
}
