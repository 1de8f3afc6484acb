//! Git operations using git2-rs.

pub mod commit;
pub mod staged;

pub use commit::{commit_staged, format_dry_run, push_origin};
pub use staged::{GitStagedChanges, StagedChanges};
