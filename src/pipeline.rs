//! The end-to-end run: locate repository, collect changes, generate a
//! message, confirm, commit.
//!
//! Each stage can end the run early. Collaborators are injected so the whole
//! flow runs headless in tests.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::commit::{DEFAULT_MODELS, GeneratedMessage, generate_commit_message, stage_and_commit};
use crate::config::Config;
use crate::confirm::Confirmer;
use crate::error::AutocommitError;
use crate::gemini::ModelBackend;
use crate::git::{Vcs, collect_changes, locate_repository};

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ConfigChecked,
    RepoReady,
    DiffCollected,
    MessageChosen,
    Confirmed,
    Committed,
    Aborted,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Committed | RunState::Aborted)
    }
}

/// Why a run stopped without committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    InitDeclined,
    NoChanges,
    CommitDeclined { message: GeneratedMessage },
    DryRun { message: GeneratedMessage },
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed { message: GeneratedMessage },
    Aborted(AbortReason),
}

/// Per-run options that do not come from the environment.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the run starts from.
    pub workdir: PathBuf,
    /// Models to try, in order.
    pub models: Vec<String>,
    /// Stop after printing the message; never write to the repository.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            dry_run: false,
        }
    }
}

pub struct Pipeline<'a, V: ?Sized, B: ?Sized, C: ?Sized> {
    config: &'a Config,
    vcs: &'a V,
    backend: &'a B,
    confirmer: &'a C,
    options: RunOptions,
    state: RunState,
}

impl<'a, V, B, C> Pipeline<'a, V, B, C>
where
    V: Vcs + ?Sized,
    B: ModelBackend + ?Sized,
    C: Confirmer + ?Sized,
{
    /// Create a pipeline. The configuration is checked again when the run starts.
    pub fn new(
        config: &'a Config,
        vcs: &'a V,
        backend: &'a B,
        confirmer: &'a C,
        options: RunOptions,
    ) -> Self {
        Self {
            config,
            vcs,
            backend,
            confirmer,
            options,
            state: RunState::ConfigChecked,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every stage. On return the state is `Committed` or `Aborted`.
    pub async fn run(&mut self) -> Result<Outcome, AutocommitError> {
        let result = self.run_stages().await;
        self.state = match &result {
            Ok(Outcome::Committed { .. }) => RunState::Committed,
            _ => RunState::Aborted,
        };
        debug!("Run finished in state {:?}", self.state);
        result
    }

    fn advance(&mut self, next: RunState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn run_stages(&mut self) -> Result<Outcome, AutocommitError> {
        self.config.validate()?;

        let location = locate_repository(
            self.vcs,
            self.confirmer,
            self.config,
            &self.options.workdir,
            !self.options.dry_run,
        )?;
        let Some(root) = location.root().map(Path::to_path_buf) else {
            return Ok(Outcome::Aborted(AbortReason::InitDeclined));
        };
        self.advance(RunState::RepoReady);

        let Some(changes) = collect_changes(self.vcs, &root, self.options.dry_run)
            .map_err(AutocommitError::ChangesFailed)?
        else {
            println!("No changes detected to commit.");
            return Ok(Outcome::Aborted(AbortReason::NoChanges));
        };
        println!("Changes detected:");
        println!("{}", changes.status);
        self.advance(RunState::DiffCollected);

        let message = generate_commit_message(
            self.backend,
            &self.options.models,
            &self.config.language,
            &changes.diff,
        )
        .await?;
        print_message(&message);
        self.advance(RunState::MessageChosen);

        if self.options.dry_run {
            println!("Dry run complete. No commit created.");
            return Ok(Outcome::Aborted(AbortReason::DryRun { message }));
        }

        if !self.confirmer.confirm("Use this message for the commit?")? {
            println!("Commit cancelled.");
            return Ok(Outcome::Aborted(AbortReason::CommitDeclined { message }));
        }
        self.advance(RunState::Confirmed);

        stage_and_commit(self.vcs, &root, &message.text).map_err(AutocommitError::CommitFailed)?;
        println!("Commit created successfully!");

        Ok(Outcome::Committed { message })
    }
}

fn print_message(message: &GeneratedMessage) {
    if message.is_fallback() {
        println!("No model produced a message, using the fallback.");
    }
    println!();
    println!("--- Generated message ---");
    println!("{}", message.text);
    println!("-------------------------");
    println!();
}
