//! Prompt template lookup.
//!
//! Templates are plain text files resolved through an ordered chain of
//! sources. The first source holding a non-empty file wins:
//!
//! 1. `templates/` next to the executable
//! 2. `~/.config/git-commit-ai/templates`
//! 3. `/usr/local/share/git-commit-ai/templates`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigStore;
use crate::error::TemplateError;

/// System message for chat-completion providers.
pub const OPENROUTER_SYSTEM: &str = "openrouter_system.txt";
/// User message for chat-completion providers.
pub const OPENROUTER_USER: &str = "openrouter_user.txt";
/// Skeleton prompt for the single-prompt provider.
pub const OLLAMA_BASE: &str = "ollama_base.txt";
pub const OLLAMA_SMALL: &str = "ollama_small.txt";
pub const OLLAMA_MEDIUM: &str = "ollama_medium.txt";
pub const OLLAMA_LARGE: &str = "ollama_large.txt";
/// Self-check appended for small and medium models.
pub const OLLAMA_FINAL_CHECK: &str = "ollama_final_check.txt";

/// Fixed installed-location fallback.
pub const SYSTEM_TEMPLATE_DIR: &str = "/usr/local/share/git-commit-ai/templates";

/// A place templates can be loaded from.
pub trait TemplateSource: Send + Sync {
    /// Return the template text, or `None` if this source does not have it.
    fn load(&self, name: &str) -> Option<String>;

    /// Where this source looks, for error reporting.
    fn location(&self) -> PathBuf;
}

/// Templates stored as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        let content = fs::read_to_string(&path).ok()?;
        let content = content.trim_end();
        if content.is_empty() {
            debug!("Template {:?} is empty, skipping", path);
            return None;
        }
        debug!("Loaded template {:?}", path);
        Some(content.to_string())
    }

    fn location(&self) -> PathBuf {
        self.dir.clone()
    }
}

/// Ordered chain of template sources; first hit wins.
pub struct TemplateStore {
    sources: Vec<Box<dyn TemplateSource>>,
}

impl TemplateStore {
    pub fn new(sources: Vec<Box<dyn TemplateSource>>) -> Self {
        Self { sources }
    }

    /// Store backed by a single directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(vec![Box::new(DirectorySource::new(dir.as_ref()))])
    }

    /// The standard search chain: executable dir, user config dir, system dir.
    pub fn discover(config: &ConfigStore) -> Self {
        let mut sources: Vec<Box<dyn TemplateSource>> = Vec::new();

        if let Some(dir) = executable_template_dir() {
            sources.push(Box::new(DirectorySource::new(dir)));
        }
        sources.push(Box::new(DirectorySource::new(config.dir().join("templates"))));
        sources.push(Box::new(DirectorySource::new(SYSTEM_TEMPLATE_DIR)));

        Self::new(sources)
    }

    /// Look a template up. Absence is not an error here.
    pub fn load(&self, name: &str) -> Option<String> {
        self.sources.iter().find_map(|source| source.load(name))
    }

    /// Look a template up, failing if no source has it.
    pub fn require(&self, name: &str) -> Result<String, TemplateError> {
        self.load(name).ok_or_else(|| TemplateError::Missing {
            name: name.to_string(),
            searched: self.locations(),
        })
    }

    /// Every location searched, in priority order.
    pub fn locations(&self) -> Vec<PathBuf> {
        self.sources.iter().map(|s| s.location()).collect()
    }
}

fn executable_template_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("templates"))
}
