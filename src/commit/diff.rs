//! Diff sizing: decide how much of the staged diff a model gets to see.

use std::fmt;

use tracing::debug;

use crate::error::CommitError;
use crate::git::StagedChanges;

/// Diffs up to this many characters are embedded verbatim.
pub const SMALL_DIFF_LIMIT: usize = 15_000;

/// Diffs up to this many characters are truncated; larger ones fall back to stats.
pub const MEDIUM_DIFF_LIMIT: usize = 50_000;

/// Number of characters kept from a truncated diff.
pub const TRUNCATE_TO: usize = 12_000;

/// How a diff is presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    Full,
    Truncated,
    StatOnly,
}

impl DiffMode {
    /// Classify a diff by its character count.
    pub fn for_length(chars: usize) -> Self {
        if chars <= SMALL_DIFF_LIMIT {
            DiffMode::Full
        } else if chars <= MEDIUM_DIFF_LIMIT {
            DiffMode::Truncated
        } else {
            DiffMode::StatOnly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffMode::Full => "full",
            DiffMode::Truncated => "truncated",
            DiffMode::StatOnly => "stat-only",
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of sizing a diff: the mode plus the text to embed, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedDiff {
    pub mode: DiffMode,
    /// `None` in [`DiffMode::StatOnly`]; the diff text is discarded.
    pub text: Option<String>,
}

/// Marker appended to a truncated diff.
pub fn truncation_marker() -> String {
    format!("\n\n[... diff truncated due to size - showing first {TRUNCATE_TO} characters only]")
}

/// Size a diff into full, truncated, or stat-only material.
///
/// Lengths are counted in characters, not bytes, so truncation never splits a
/// multi-byte character.
pub fn size_diff(diff_text: &str) -> SizedDiff {
    let chars = diff_text.chars().count();
    let mode = DiffMode::for_length(chars);

    debug!("Diff content size: {chars} characters, mode={mode}");

    let text = match mode {
        DiffMode::Full => Some(diff_text.to_string()),
        DiffMode::Truncated => {
            let mut kept: String = diff_text.chars().take(TRUNCATE_TO).collect();
            kept.push_str(&truncation_marker());
            Some(kept)
        }
        DiffMode::StatOnly => None,
    };

    SizedDiff { mode, text }
}

/// Everything the prompt builder needs to know about the staged changes.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPayload {
    /// Name-status listing, one changed path per line.
    pub file_changes: String,
    pub mode: DiffMode,
    /// Full or truncated diff text. Empty in [`DiffMode::StatOnly`].
    pub diff_text: String,
    /// File-level statistics. Only populated in [`DiffMode::StatOnly`].
    pub stat_summary: String,
}

impl DiffPayload {
    /// Build a payload from already-collected change text.
    ///
    /// `stat_summary` is consulted only when the diff is too large to embed.
    pub fn from_parts<F>(
        file_changes: &str,
        diff_text: &str,
        stat_summary: F,
    ) -> Result<Self, CommitError>
    where
        F: FnOnce() -> Result<String, CommitError>,
    {
        let file_changes = file_changes.trim();
        if file_changes.is_empty() {
            return Err(CommitError::NoChanges);
        }

        let sized = size_diff(diff_text);
        let (diff_text, stat_summary) = match sized.text {
            Some(text) => (text, String::new()),
            None => {
                debug!("Diff too large, using file statistics only");
                (String::new(), stat_summary()?)
            }
        };

        Ok(Self {
            file_changes: file_changes.to_string(),
            mode: sized.mode,
            diff_text,
            stat_summary,
        })
    }

    /// Collect and size the staged changes from a provider.
    pub fn collect<S: StagedChanges + ?Sized>(source: &S) -> Result<Self, CommitError> {
        let file_changes = source.file_changes()?;
        if file_changes.trim().is_empty() {
            return Err(CommitError::NoChanges);
        }
        let diff_text = source.full_diff()?;
        Self::from_parts(&file_changes, &diff_text, || source.stat_summary())
    }

    /// Whether diff text (full or truncated) is embedded rather than stats.
    pub fn uses_diff(&self) -> bool {
        self.mode != DiffMode::StatOnly
    }
}
