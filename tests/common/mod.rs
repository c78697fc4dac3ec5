//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use autocommit::config::{API_BASE_VAR, API_KEY_VAR, USER_EMAIL_VAR, USER_NAME_VAR};
use autocommit::error::{GenerateError, GitError, PromptError};
use autocommit::gemini::classify_failure;
use autocommit::{Config, Confirmer, ModelBackend, ModelOutcome, Vcs};

pub const SAMPLE_DIFF: &str = "diff --git a/x.txt b/x.txt\n\
new file mode 100644\n\
--- /dev/null\n\
+++ b/x.txt\n\
@@ -0,0 +1 @@\n\
+hello";

/// Configuration with every required value set.
pub fn test_config() -> Config {
    config_with_base("http://127.0.0.1:9")
}

/// Configuration pointing the Gemini client at `api_base`.
pub fn config_with_base(api_base: &str) -> Config {
    let api_base = api_base.to_string();
    Config::from_lookup(move |name| match name {
        n if n == API_KEY_VAR => Some("test-key".to_string()),
        n if n == USER_NAME_VAR => Some("Test User".to_string()),
        n if n == USER_EMAIL_VAR => Some("test@example.com".to_string()),
        n if n == API_BASE_VAR => Some(api_base.clone()),
        _ => None,
    })
    .expect("test config should load")
}

/// In-memory [`Vcs`] that records every call.
pub struct FakeVcs {
    /// Root reported by `toplevel`; `None` makes discovery fail.
    pub toplevel: Option<PathBuf>,
    pub has_marker: Cell<bool>,
    pub status: String,
    pub diff: String,
    pub fail_init: bool,
    pub fail_diff: bool,
    pub fail_commit: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    /// A directory that is not yet a repository but has `x.txt` in it.
    pub fn unversioned() -> Self {
        Self {
            toplevel: None,
            has_marker: Cell::new(false),
            status: "?? x.txt".to_string(),
            diff: SAMPLE_DIFF.to_string(),
            fail_init: false,
            fail_diff: false,
            fail_commit: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// An existing repository rooted at `root` with the given status.
    pub fn existing(root: &Path, status: &str, diff: &str) -> Self {
        Self {
            toplevel: Some(root.to_path_buf()),
            has_marker: Cell::new(true),
            status: status.to_string(),
            diff: diff.to_string(),
            fail_init: false,
            fail_diff: false,
            fail_commit: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn failure(operation: &str) -> GitError {
        GitError::NonZeroExit {
            operation: operation.to_string(),
            code: 128,
            stderr: format!("fatal: {operation} failed"),
        }
    }
}

impl Vcs for FakeVcs {
    fn toplevel(&self, _dir: &Path) -> Result<PathBuf, GitError> {
        self.record("rev-parse");
        self.toplevel
            .clone()
            .ok_or_else(|| Self::failure("rev-parse"))
    }

    fn is_repo_root(&self, _dir: &Path) -> bool {
        self.has_marker.get()
    }

    fn init(&self, _dir: &Path) -> Result<(), GitError> {
        self.record("init");
        if self.fail_init {
            return Err(Self::failure("init"));
        }
        self.has_marker.set(true);
        Ok(())
    }

    fn set_identity(&self, _dir: &Path, name: &str, email: &str) -> Result<(), GitError> {
        self.record(format!("identity {name} <{email}>"));
        Ok(())
    }

    fn status(&self, _dir: &Path) -> Result<String, GitError> {
        self.record("status");
        Ok(self.status.clone())
    }

    fn untracked_files(&self, _dir: &Path) -> Result<Vec<PathBuf>, GitError> {
        self.record("ls-files --others");
        Ok(self
            .status
            .lines()
            .filter_map(|line| line.strip_prefix("?? "))
            .map(PathBuf::from)
            .collect())
    }

    fn intent_to_add_all(&self, _dir: &Path) -> Result<(), GitError> {
        self.record("add -N");
        Ok(())
    }

    fn diff(&self, _dir: &Path) -> Result<String, GitError> {
        self.record("diff");
        if self.fail_diff {
            return Err(Self::failure("diff"));
        }
        Ok(self.diff.clone())
    }

    fn diff_against_empty(&self, _dir: &Path, file: &Path) -> Result<String, GitError> {
        self.record(format!("diff --no-index {}", file.display()));
        Ok(format!("+++ b/{}\n", file.display()))
    }

    fn reset(&self, _dir: &Path) -> Result<(), GitError> {
        self.record("reset");
        Ok(())
    }

    fn stage_all(&self, _dir: &Path) -> Result<(), GitError> {
        self.record("add --all");
        Ok(())
    }

    fn commit(&self, _dir: &Path, message: &str) -> Result<(), GitError> {
        self.record(format!("commit {message}"));
        if self.fail_commit {
            return Err(Self::failure("commit"));
        }
        Ok(())
    }
}

/// [`Confirmer`] that replays scripted answers and records the questions.
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    pub questions: RefCell<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            questions: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> usize {
        self.questions.borrow().len()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        self.questions.borrow_mut().push(question.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or(PromptError::Cancelled)
    }
}

/// Scripted reply of one model.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    Status(u16),
}

/// [`ModelBackend`] answering from a per-model script.
#[derive(Default)]
pub struct StubBackend {
    replies: HashMap<String, Reply>,
    pub attempts: Mutex<Vec<(String, String)>>,
}

impl StubBackend {
    pub fn new(replies: &[(&str, Reply)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(model, reply)| (model.to_string(), reply.clone()))
                .collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Models attempted, in order.
    pub fn models_tried(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    async fn attempt(&self, model: &str, prompt: &str) -> ModelOutcome {
        self.attempts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));

        match self.replies.get(model) {
            Some(Reply::Text(text)) => ModelOutcome::Text(text.to_string()),
            Some(Reply::Status(code)) => {
                let status = StatusCode::from_u16(*code).expect("valid status code");
                classify_failure(status, "")
            }
            None => ModelOutcome::Skip(GenerateError::Transport("connection refused".into())),
        }
    }
}

/// Run git in `dir` and return trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A scratch git repository with a committer identity configured.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Stage everything and commit, returning the new commit hash.
    pub fn commit_all(&self, message: &str) -> String {
        git(self.path(), &["add", "--all"]);
        git(self.path(), &["commit", "--quiet", "-m", message]);
        git(self.path(), &["rev-parse", "HEAD"])
    }

    pub fn last_message(&self) -> String {
        git(self.path(), &["log", "-1", "--format=%B"])
    }
}
