//! Git operations for commit message generation
//!
//! This module provides functions to interact with git:
//! - Get staged diffs
//! - Execute git commit with the accepted message
//!
//! Git is always run with the repository directory as its working
//! directory, so any subdirectory of a work tree, a linked worktree or a
//! submodule works the same as the top level.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Access to the repository the commit is made in
pub trait VersionControl {
    /// Diff of the staged changes; empty when nothing is staged
    fn staged_diff(&self) -> Result<String>;

    /// Commit the staged changes with `message`
    fn commit(&mut self, message: &str) -> Result<()>;
}

/// A git repository, by default the one containing the current directory
#[derive(Debug, Default, Clone)]
pub struct GitRepository {
    dir: Option<PathBuf>,
}

impl GitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository containing `dir`
    ///
    /// # Arguments
    ///
    /// * `dir` - Any directory inside the work tree
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn git(&self) -> Command {
        let mut command = Command::new("git");
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        command
    }
}

impl VersionControl for GitRepository {
    fn staged_diff(&self) -> Result<String> {
        get_git_diff(self.git())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        run_git_commit(self.git(), message)
    }
}

/// Get git diff from the staging area
///
/// Executes `git diff --cached` to retrieve all staged changes.
///
/// # Errors
///
/// * Git command fails to execute
/// * Not in a git repository
fn get_git_diff(mut git: Command) -> Result<String> {
    let output = git
        .args(["diff", "--cached"])
        .output()
        .context("Failed to execute git command. Make sure git is installed and in PATH")?;

    if !output.status.success() {
        anyhow::bail!(
            "Git diff command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Execute `git commit -F -`, passing the message on stdin
///
/// # Arguments
///
/// * `git` - Git command set up for the repository
/// * `message` - Accepted commit message
///
/// # Errors
///
/// * Failed to execute git command
/// * Commit hook rejected the commit
fn run_git_commit(mut git: Command, message: &str) -> Result<()> {
    let mut child = git
        .args(["commit", "-F", "-"])
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to execute git commit command")?;

    // stdin is closed when dropped, before waiting on git
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(message.as_bytes())
            .context("Failed to pass the commit message to git")?;
    }

    let status = child.wait().context("Failed to wait for git commit")?;
    if !status.success() {
        anyhow::bail!(
            "Git commit command failed with exit code: {:?}",
            status.code()
        );
    }

    Ok(())
}
