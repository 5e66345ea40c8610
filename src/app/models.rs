use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Default per-file size ceiling, in kilobytes.
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 2048;

/// One category and the globs that capture files into it.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategoryPatterns {
    pub category: String,
    pub patterns: Vec<String>,
}

/// Represents the final configuration after merging the config file and CLI args.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlueprintConfig {
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Ordered: the first category with a matching pattern wins.
    #[serde(default)]
    pub core_file_patterns: Vec<CategoryPatterns>,
    #[serde(default)]
    pub category_order: Vec<String>,
    #[serde(default = "default_max_file_size_kb")]
    pub max_file_size_kb: u64,
    #[serde(default = "default_true")]
    pub annotate_provenance: bool,
    #[serde(default)]
    pub respect_gitignore: bool,
}

fn default_max_file_size_kb() -> u64 {
    DEFAULT_MAX_FILE_SIZE_KB
}

fn default_true() -> bool {
    true
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            core_file_patterns: Vec::new(),
            category_order: Vec::new(),
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            annotate_provenance: true,
            respect_gitignore: false,
        }
    }
}

impl BlueprintConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }
}

/// A file that passed classification and the content checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    /// Root-relative, `/`-separated.
    pub relative_path: String,
    pub category: String,
    pub pattern: String,
}

/// Why a classified file was left out of the blueprint.
#[derive(Debug)]
pub enum SkipReason {
    TooLarge { size: u64, limit: u64 },
    Binary,
    NotRegular,
    StatError(std::io::Error),
    ReadError(std::io::Error),
}

impl SkipReason {
    /// Short label used to group skips in the summary.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::TooLarge { .. } => "too large",
            SkipReason::Binary => "binary",
            SkipReason::NotRegular => "not a regular file",
            SkipReason::StatError(_) => "stat error",
            SkipReason::ReadError(_) => "read error",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooLarge { size, limit } => {
                write!(f, "too large ({} bytes, limit {} bytes)", size, limit)
            }
            SkipReason::Binary => write!(f, "binary"),
            SkipReason::NotRegular => write!(f, "not a regular file"),
            SkipReason::StatError(e) => write!(f, "error stating file: {}", e),
            SkipReason::ReadError(e) => write!(f, "error reading file: {}", e),
        }
    }
}

#[derive(Debug)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: SkipReason,
}

/// Everything learned from one traversal pass.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files_by_category: HashMap<String, Vec<ClassifiedFile>>,
    pub total_files_scanned: usize,
    pub ignored_files: usize,
    pub unclassified_files: usize,
    pub pruned_dirs: usize,
    pub skipped: Vec<SkippedFile>,
}

impl ScanResult {
    pub fn accepted_count(&self) -> usize {
        self.files_by_category.values().map(Vec::len).sum()
    }
}

/// Outcome of the write pass.
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Captured counts in `category_order`, empty categories omitted.
    pub captured_by_category: Vec<(String, usize)>,
    pub failed: Vec<SkippedFile>,
}

impl WriteReport {
    pub fn total_captured(&self) -> usize {
        self.captured_by_category.iter().map(|(_, n)| n).sum()
    }
}
