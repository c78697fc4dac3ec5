//! Git operations through the system `git` binary.

pub mod changes;
pub mod client;
pub mod repo;

pub use changes::{PendingChanges, collect_changes};
pub use client::{GitCli, REPO_MARKER, Vcs, check_git_installed};
pub use repo::{RepoLocation, locate_repository};
