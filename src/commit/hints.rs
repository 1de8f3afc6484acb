//! Heuristic change hints.
//!
//! Each detector inspects the change list and diff text and, when it fires,
//! contributes one advisory line to the model instructions. Hints never force
//! a commit type; they only nudge smaller models.

use std::fmt;

use regex_lite::Regex;

/// Paths (lowercased) that mark a dependency, build or CI change.
const DEPENDENCY_MARKERS: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "setup.py",
    "setup.cfg",
    "pyproject.toml",
    "poetry.lock",
    "pipfile",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.toml",
    "cargo.lock",
    "go.mod",
    "go.sum",
    "gemfile",
    "composer.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "makefile",
    ".yml",
    ".yaml",
    "dockerfile",
    "containerfile",
    "docker-compose",
];

const FORMATTING_KEYWORDS: &[&str] = &["spacing", "indentation", "format"];

const PERFORMANCE_KEYWORDS: &[&str] = &[
    "optimize",
    "optimise",
    "optimization",
    "cache",
    "performance",
    "faster",
    "speed up",
    "latency",
    "memoize",
    "efficient",
    "select_related",
    "prefetch_related",
];

const REFACTOR_KEYWORDS: &[&str] = &[
    "restructure",
    "reorganize",
    "reorganise",
    "architecture",
    "refactor",
    "redesign",
];

/// Number of non-blank change-list lines that counts as a large change.
pub const LARGE_CHANGE_FILE_COUNT: usize = 3;

/// Comparison operators whose spacing is stylistic.
const COMPARISON_OPERATORS: &[&str] = &["<=", ">=", "==", "!=", "<", ">"];

/// A category of change detected in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeHint {
    Formatting,
    Dependency,
    Performance,
    LargeRefactor,
}

impl ChangeHint {
    /// Advisory text appended to the instructions.
    pub fn advice(&self) -> &'static str {
        match self {
            ChangeHint::Formatting => {
                "Hint: the diff looks like whitespace or formatting changes only; if no behavior changes, use type 'style'."
            }
            ChangeHint::Dependency => {
                "Hint: dependency, build or CI files changed; if that is all that changed, use type 'chore'."
            }
            ChangeHint::Performance => {
                "Hint: the change appears to target performance; if it makes code faster without changing behavior, use type 'perf'."
            }
            ChangeHint::LargeRefactor => {
                "Hint: several files changed together; if code is restructured without new behavior, use type 'refactor'."
            }
        }
    }
}

impl fmt::Display for ChangeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.advice())
    }
}

/// Run every detector and return the hints that fired, in a fixed order.
///
/// `file_changes` is the name-status listing; `diff_text` is the diff (or the
/// stat summary when the diff was too large to embed).
pub fn detect_hints(file_changes: &str, diff_text: &str) -> Vec<ChangeHint> {
    let mut hints = Vec::new();

    if is_formatting_change(diff_text) {
        hints.push(ChangeHint::Formatting);
    }
    if is_dependency_change(file_changes) {
        hints.push(ChangeHint::Dependency);
    }
    if is_performance_change(diff_text) {
        hints.push(ChangeHint::Performance);
    }
    if is_large_refactor(file_changes) {
        hints.push(ChangeHint::LargeRefactor);
    }

    hints
}

/// Operator-spacing churn, or formatting keywords anywhere in the diff.
pub fn is_formatting_change(diff_text: &str) -> bool {
    if contains_keyword(diff_text, FORMATTING_KEYWORDS) {
        return true;
    }

    let (removed, added) = changed_lines(diff_text);
    COMPARISON_OPERATORS
        .iter()
        .any(|op| has_respaced_operator(&removed, &added, op))
}

/// Whether a removed line and an added line differ only in whitespace, with
/// `op` written tight on one side and spaced on the other.
///
/// A generic such as `Vec<String>` on an unrelated line never pairs.
fn has_respaced_operator(removed: &[&str], added: &[&str], op: &str) -> bool {
    let escaped = regex_lite::escape(op);
    // Operands must be word characters or brackets on both sides, so `<` inside
    // `<=`, `->` or `<<` never counts.
    let tight = format!(r"[\w)\]]{escaped}[\w(\[]");
    let spaced = format!(r"[\w)\]][ \t]+{escaped}[ \t]+[\w(\[]");

    let (Ok(tight), Ok(spaced)) = (Regex::new(&tight), Regex::new(&spaced)) else {
        return false;
    };

    removed.iter().any(|old| {
        added.iter().any(|new| {
            old != new
                && strip_whitespace(old) == strip_whitespace(new)
                && ((tight.is_match(old) && spaced.is_match(new))
                    || (spaced.is_match(old) && tight.is_match(new)))
        })
    })
}

/// Removed and added lines with their `-`/`+` markers stripped.
fn changed_lines(diff_text: &str) -> (Vec<&str>, Vec<&str>) {
    let removed = diff_text
        .lines()
        .filter(|l| l.starts_with('-') && !l.starts_with("---"))
        .map(|l| &l[1..])
        .collect();
    let added = diff_text
        .lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .map(|l| &l[1..])
        .collect();
    (removed, added)
}

fn strip_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Any changed path whose lowercase form contains a manifest or CI marker.
pub fn is_dependency_change(file_changes: &str) -> bool {
    file_changes
        .lines()
        .map(str::to_lowercase)
        .any(|line| DEPENDENCY_MARKERS.iter().any(|marker| line.contains(marker)))
}

/// A loop that accumulates into a collection replaced by a single query or
/// collection call, or generic performance vocabulary.
pub fn is_performance_change(diff_text: &str) -> bool {
    if contains_keyword(diff_text, PERFORMANCE_KEYWORDS) {
        return true;
    }

    let (removed, added) = changed_lines(diff_text);

    let (Ok(loop_re), Ok(accumulate_re), Ok(collect_re)) = (
        Regex::new(r"\bfor\b.*\bin\b|\bforEach\b|\bwhile\b"),
        Regex::new(r"\.(append|push|add|extend|insert)\(|\+="),
        Regex::new(r"\blist\(|\.collect\b|\.filter\(|\.all\(\)|\.map\(|\bIN\s*\("),
    ) else {
        return false;
    };

    let removed_loop = removed.iter().any(|l| loop_re.is_match(l));
    let removed_accumulation = removed.iter().any(|l| accumulate_re.is_match(l));
    let added_collection = added.iter().any(|l| collect_re.is_match(l));

    removed_loop && removed_accumulation && added_collection
}

/// Three or more changed files, or refactor vocabulary in the change list.
pub fn is_large_refactor(file_changes: &str) -> bool {
    let changed = file_changes.lines().filter(|l| !l.trim().is_empty()).count();
    changed >= LARGE_CHANGE_FILE_COUNT || contains_keyword(file_changes, REFACTOR_KEYWORDS)
}

fn contains_keyword(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}
