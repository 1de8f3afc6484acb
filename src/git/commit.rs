//! Committing the index and pushing the result.

use std::path::Path;
use std::process::Command;

use git2::{ErrorCode, Oid, Repository};
use tracing::debug;

use crate::error::CommitError;

/// Commit whatever is in the index on HEAD.
///
/// Works on an unborn branch, where the commit has no parent.
pub fn commit_staged(repo: &Repository, message: &str) -> Result<Oid, CommitError> {
    let mut index = repo.index().map_err(CommitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(CommitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let sig = repo.signature().map_err(CommitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(CommitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(CommitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(CommitError::CommitFailed)?;

    debug!("Created commit {}", oid);
    Ok(oid)
}

/// Push the current branch to `origin` with the `git` binary.
///
/// Runs with the user's credential helpers and SSH agent.
pub fn push_origin(workdir: &Path) -> Result<(), CommitError> {
    run_git(workdir, &["push", "origin"], "push")
}

/// Preview text shown instead of committing.
pub fn format_dry_run(message: &str) -> String {
    let rule = "=".repeat(39);
    format!(
        "Dry run mode - Generated commit message:\n{rule}\n{message}\n{rule}\n\
         Use 'cmai' without --dry-run to execute the commit."
    )
}

fn run_git(workdir: &Path, args: &[&str], operation: &str) -> Result<(), CommitError> {
    debug!("Running git {}", args.join(" "));
    let output = Command::new("git")
        .current_dir(workdir)
        .args(args)
        .output()
        .map_err(|e| CommitError::PushFailed(format!("Failed to run git {}: {}", operation, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommitError::PushFailed(format!(
            "git {} failed: {}",
            operation,
            stderr.trim()
        )));
    }

    Ok(())
}
