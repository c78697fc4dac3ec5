//! Narrow interface over the `git` command-line client.
//!
//! All operations use `std::process::Command` to shell out to the system `git`
//! binary, inheriting the user's existing git config.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::error::GitError;

/// Name of the directory that marks a repository root.
pub const REPO_MARKER: &str = ".git";

/// Version-control operations needed by the pipeline.
///
/// Every method takes the directory the command runs in, so a fake can be
/// substituted in tests without a real repository.
pub trait Vcs {
    /// Resolve the enclosing repository root of `dir`.
    fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError>;

    /// Whether `dir` itself carries a repository marker.
    fn is_repo_root(&self, dir: &Path) -> bool {
        dir.join(REPO_MARKER).exists()
    }

    fn init(&self, dir: &Path) -> Result<(), GitError>;

    /// Set `user.name` and `user.email` in the repository config.
    fn set_identity(&self, dir: &Path, name: &str, email: &str) -> Result<(), GitError>;

    /// Short status listing (`git status --porcelain`).
    fn status(&self, dir: &Path) -> Result<String, GitError>;

    /// Untracked, non-ignored files relative to `dir`, without touching the index.
    fn untracked_files(&self, dir: &Path) -> Result<Vec<PathBuf>, GitError>;

    /// Record untracked files as intent-to-add so they show up in `diff`.
    fn intent_to_add_all(&self, dir: &Path) -> Result<(), GitError>;

    /// Unstaged diff of the working tree.
    fn diff(&self, dir: &Path) -> Result<String, GitError>;

    /// Diff of `file` against an empty baseline, outside any repository.
    fn diff_against_empty(&self, dir: &Path, file: &Path) -> Result<String, GitError>;

    /// Unstage everything (`git reset`).
    fn reset(&self, dir: &Path) -> Result<(), GitError>;

    /// Stage all changes (`git add --all`).
    fn stage_all(&self, dir: &Path) -> Result<(), GitError>;

    fn commit(&self, dir: &Path, message: &str) -> Result<(), GitError>;
}

/// Check that the `git` executable is on `PATH`.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// [`Vcs`] implementation backed by the system `git` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

impl Vcs for GitCli {
    fn toplevel(&self, dir: &Path) -> Result<PathBuf, GitError> {
        let stdout = run_git(dir, &["rev-parse", "--show-toplevel"], "rev-parse")?;
        Ok(PathBuf::from(stdout.trim()))
    }

    fn init(&self, dir: &Path) -> Result<(), GitError> {
        run_git(dir, &["init"], "init").map(drop)
    }

    fn set_identity(&self, dir: &Path, name: &str, email: &str) -> Result<(), GitError> {
        run_git(dir, &["config", "user.name", name], "config user.name")?;
        run_git(dir, &["config", "user.email", email], "config user.email")?;
        Ok(())
    }

    fn status(&self, dir: &Path) -> Result<String, GitError> {
        let stdout = run_git(dir, &["status", "--porcelain"], "status")?;
        Ok(stdout.trim_end().to_string())
    }

    fn untracked_files(&self, dir: &Path) -> Result<Vec<PathBuf>, GitError> {
        let stdout = run_git(
            dir,
            &["ls-files", "--others", "--exclude-standard", "-z"],
            "ls-files --others",
        )?;
        Ok(stdout
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    fn intent_to_add_all(&self, dir: &Path) -> Result<(), GitError> {
        run_git(dir, &["add", "-N", "."], "add -N").map(drop)
    }

    fn diff(&self, dir: &Path) -> Result<String, GitError> {
        let stdout = run_git(dir, &["diff"], "diff")?;
        Ok(stdout.trim().to_string())
    }

    fn diff_against_empty(&self, dir: &Path, file: &Path) -> Result<String, GitError> {
        let operation = "diff --no-index";
        let output = git_command(dir)
            .args(["diff", "--no-index", "--", "/dev/null"])
            .arg(file)
            .output()
            .map_err(|source| GitError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        // Exit code 1 means the inputs differ, which is always the case here.
        match output.status.code() {
            Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).to_string()),
            _ => Err(non_zero_exit(operation, &output)),
        }
    }

    fn reset(&self, dir: &Path) -> Result<(), GitError> {
        run_git(dir, &["reset"], "reset").map(drop)
    }

    fn stage_all(&self, dir: &Path) -> Result<(), GitError> {
        run_git(dir, &["add", "--all"], "add --all").map(drop)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<(), GitError> {
        run_git(dir, &["commit", "-m", message], "commit").map(drop)
    }
}

fn git_command(dir: &Path) -> Command {
    let mut command = Command::new("git");
    command.current_dir(dir);
    command
}

/// Run a git command in `dir` and return its stdout.
fn run_git(dir: &Path, args: &[&str], operation: &str) -> Result<String, GitError> {
    debug!("git {} (in {})", args.join(" "), dir.display());

    let output = git_command(dir)
        .args(args)
        .output()
        .map_err(|source| GitError::SpawnFailed {
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(non_zero_exit(operation, &output));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn non_zero_exit(operation: &str, output: &Output) -> GitError {
    GitError::NonZeroExit {
        operation: operation.to_string(),
        code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
