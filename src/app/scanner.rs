use crate::app::classifier::{normalize_relative, Classifier, IgnoreSet};
use crate::app::error::BlueprintError;
use crate::app::filters::check_file;
use crate::app::models::{BlueprintConfig, ClassifiedFile, ScanResult, SkippedFile};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct Scanner {
    root: PathBuf,
    ignore_set: IgnoreSet,
    classifier: Classifier,
    max_file_size: u64,
    respect_gitignore: bool,
    excluded_path: Option<PathBuf>,
}

impl Scanner {
    /// Fails if `root` is not an existing, readable directory or if any
    /// configured glob does not compile.
    pub fn new(root: &Path, config: &BlueprintConfig) -> Result<Self, BlueprintError> {
        Ok(Self {
            root: validate_root(root)?,
            ignore_set: IgnoreSet::new(&config.ignore_patterns)?,
            classifier: Classifier::new(&config.core_file_patterns)?,
            max_file_size: config.max_file_size_bytes(),
            respect_gitignore: config.respect_gitignore,
            excluded_path: None,
        })
    }

    /// Never classify `path` (typically the blueprint being written).
    /// Expects a canonical path.
    pub fn with_excluded_path(mut self, path: Option<PathBuf>) -> Self {
        self.excluded_path = path;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the tree once, pruning ignored directories before descending
    /// into them, and collects every accepted file by category.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        let pruned = Arc::new(AtomicUsize::new(0));

        for entry in self.walk_builder(Arc::clone(&pruned)).build() {
            match entry {
                Ok(entry) => {
                    if entry.depth() == 0 || !is_regular_file(&entry) {
                        continue;
                    }
                    self.process_file(entry.path(), &mut result);
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        result.pruned_dirs = pruned.load(Ordering::Relaxed);
        result
    }

    fn walk_builder(&self, pruned: Arc<AtomicUsize>) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);
        builder.standard_filters(false).follow_links(false);

        if self.respect_gitignore {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .ignore(true)
                .parents(true)
                .require_git(false);
        }

        let root = self.root.clone();
        let ignore_set = self.ignore_set.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            let Some(relative) = diff_paths(entry.path(), &root) else {
                return true;
            };
            let relative = normalize_relative(&relative);
            if ignore_set.is_ignored_dir(&relative) {
                log::debug!("Pruned directory: {}/", relative);
                pruned.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            true
        });
        builder
    }

    fn process_file(&self, path: &Path, result: &mut ScanResult) {
        result.total_files_scanned += 1;

        let Some(relative) = diff_paths(path, &self.root) else {
            return;
        };
        let relative_str = normalize_relative(&relative);

        if self.excluded_path.as_deref() == Some(path) {
            log::debug!("Skipping output file: {}", relative_str);
            result.ignored_files += 1;
            return;
        }

        // Ignore globs can target files directly (lock files, logs) even
        // when their directory was kept.
        if self.ignore_set.is_ignored_file(&relative_str) {
            log::debug!("Ignored: {}", relative_str);
            result.ignored_files += 1;
            return;
        }

        let Some(hit) = self.classifier.classify(&relative_str) else {
            log::debug!("Unclassified: {}", relative_str);
            result.unclassified_files += 1;
            return;
        };

        match check_file(path, self.max_file_size) {
            Ok(()) => {
                let file = ClassifiedFile {
                    path: path.to_path_buf(),
                    relative_path: relative_str,
                    category: hit.category.to_string(),
                    pattern: hit.pattern.to_string(),
                };
                result
                    .files_by_category
                    .entry(file.category.clone())
                    .or_default()
                    .push(file);
            }
            Err(reason) => {
                log::warn!("[!] Skipped ({}): {}", reason, relative_str);
                result.skipped.push(SkippedFile {
                    relative_path: relative_str,
                    reason,
                });
            }
        }
    }
}

/// Regular files, or symlinks resolving to one. Pipes, sockets and device
/// nodes are neither counted nor opened.
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => fs::metadata(entry.path()).is_ok_and(|m| m.is_file()),
        _ => false,
    }
}

fn validate_root(root: &Path) -> Result<PathBuf, BlueprintError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BlueprintError::PathNotFound(root.to_path_buf()),
        _ => BlueprintError::AccessDenied(root.to_path_buf(), e),
    })?;
    if !meta.is_dir() {
        return Err(BlueprintError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|e| BlueprintError::AccessDenied(root.to_path_buf(), e))?;
    fs::canonicalize(root).map_err(|e| BlueprintError::AccessDenied(root.to_path_buf(), e))
}
