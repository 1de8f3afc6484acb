//! Staged changes read straight from the index with git2.

use std::path::Path;

use git2::{
    Delta, Diff, DiffFindOptions, DiffFormat, DiffStatsFormat, ErrorCode, IndexAddOption,
    Repository, Tree,
};
use tracing::debug;

use crate::error::CommitError;

/// Width used when rendering the per-file stat graph.
const STAT_WIDTH: usize = 80;

/// Source of the staged changes a commit message is written for.
pub trait StagedChanges {
    /// One line per changed path, `"<status> <path>"`.
    fn file_changes(&self) -> Result<String, CommitError>;

    /// Unified diff of the index against HEAD.
    fn full_diff(&self) -> Result<String, CommitError>;

    /// Per-file insertion/deletion summary with a totals line.
    fn stat_summary(&self) -> Result<String, CommitError>;
}

/// [`StagedChanges`] backed by a git repository.
pub struct GitStagedChanges {
    repo: Repository,
}

impl GitStagedChanges {
    /// Open the repository containing `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CommitError> {
        let repo = Repository::discover(path).map_err(CommitError::OpenRepository)?;
        Ok(Self { repo })
    }

    pub fn from_repo(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Stage everything in the working tree, deletions included.
    pub fn stage_all(&self) -> Result<(), CommitError> {
        let mut index = self.repo.index().map_err(CommitError::StagingFailed)?;
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(CommitError::StagingFailed)?;
        index
            .update_all(["*"].iter(), None)
            .map_err(CommitError::StagingFailed)?;
        index.write().map_err(CommitError::StagingFailed)?;
        debug!("Staged all working tree changes");
        Ok(())
    }

    fn staged_diff(&self) -> Result<Diff<'_>, CommitError> {
        let head_tree = resolve_head_tree(&self.repo)?;
        let mut diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(CommitError::DiffFailed)?;

        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))
            .map_err(CommitError::DiffFailed)?;

        Ok(diff)
    }
}

impl StagedChanges for GitStagedChanges {
    fn file_changes(&self) -> Result<String, CommitError> {
        let diff = self.staged_diff()?;
        let lines: Vec<String> = diff
            .deltas()
            .filter_map(|delta| {
                let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
                let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

                match delta.status() {
                    Delta::Renamed | Delta::Copied => Some(format!(
                        "{} {} {}",
                        status_letter(delta.status()),
                        old_path.unwrap_or_default(),
                        new_path.unwrap_or_default()
                    )),
                    status => new_path
                        .or(old_path)
                        .map(|path| format!("{} {}", status_letter(status), path)),
                }
            })
            .collect();

        Ok(lines.join("\n"))
    }

    fn full_diff(&self) -> Result<String, CommitError> {
        let diff = self.staged_diff()?;
        let mut text = String::new();

        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if origin == '+' || origin == '-' || origin == ' ' {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(CommitError::DiffFailed)?;

        Ok(text)
    }

    fn stat_summary(&self) -> Result<String, CommitError> {
        let diff = self.staged_diff()?;
        let stats = diff.stats().map_err(CommitError::DiffFailed)?;
        let buf = stats
            .to_buf(DiffStatsFormat::FULL, STAT_WIDTH)
            .map_err(CommitError::DiffFailed)?;
        Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
    }
}

/// Letter `git diff --name-status` prints for a delta.
fn status_letter(status: Delta) -> char {
    match status {
        Delta::Added | Delta::Untracked => 'A',
        Delta::Deleted => 'D',
        Delta::Renamed => 'R',
        Delta::Copied => 'C',
        Delta::Typechange => 'T',
        Delta::Conflicted => 'U',
        _ => 'M',
    }
}

/// Resolve HEAD to its tree, returning `None` for an unborn branch.
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, CommitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(CommitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(CommitError::DiffFailed)?;
    Ok(Some(tree))
}
