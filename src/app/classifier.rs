use crate::app::error::BlueprintError;
use crate::app::models::CategoryPatterns;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

/// Result of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub category: &'a str,
    pub pattern: &'a str,
}

/// Maps relative paths onto at most one category.
///
/// All patterns from all categories are compiled into a single `GlobSet`,
/// indexed in declaration order, so the lowest matching index is the first
/// `(category, pattern)` pair a sequential scan would have hit.
#[derive(Debug, Clone)]
pub struct Classifier {
    set: GlobSet,
    // Parallel to the glob indices in `set`: (category index, pattern).
    entries: Vec<(usize, String)>,
    categories: Vec<String>,
}

impl Classifier {
    pub fn new(categories: &[CategoryPatterns]) -> Result<Self, BlueprintError> {
        let mut builder = GlobSetBuilder::new();
        let mut entries = Vec::new();

        for (idx, cat) in categories.iter().enumerate() {
            for pat in &cat.patterns {
                builder.add(compile_glob(pat)?);
                entries.push((idx, pat.clone()));
            }
        }

        Ok(Self {
            set: build(builder)?,
            entries,
            categories: categories.iter().map(|c| c.category.clone()).collect(),
        })
    }

    /// `relative` must already be `/`-separated (see [`normalize_relative`]).
    pub fn classify(&self, relative: &str) -> Option<Classification<'_>> {
        let first = self.set.matches(relative).into_iter().min()?;
        let (cat_idx, pattern) = &self.entries[first];
        Some(Classification {
            category: &self.categories[*cat_idx],
            pattern,
        })
    }
}

/// Ignore globs, used both for pruning directories and dropping files.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: GlobSet,
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<Self, BlueprintError> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            builder.add(compile_glob(pat)?);
        }
        Ok(Self {
            set: build(builder)?,
        })
    }

    pub fn is_ignored_file(&self, relative: &str) -> bool {
        self.set.is_match(relative)
    }

    /// Directories are tested with a trailing `/` so patterns such as
    /// `build/` or `node_modules/*` can target them.
    pub fn is_ignored_dir(&self, relative: &str) -> bool {
        self.set.is_match(format!("{}/", relative.trim_end_matches('/')))
    }
}

/// Joins the components of a root-relative path with `/`, whatever the
/// platform separator.
pub fn normalize_relative(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// `*` is allowed to cross `/`, like shell fnmatch; `**/` still spans
// whole directories.
fn compile_glob(pattern: &str) -> Result<Glob, BlueprintError> {
    Glob::new(pattern).map_err(|e| BlueprintError::InvalidPattern(pattern.to_string(), e))
}

fn build(builder: GlobSetBuilder) -> Result<GlobSet, BlueprintError> {
    builder
        .build()
        .map_err(|e| BlueprintError::InvalidPattern("<glob set>".to_string(), e))
}
