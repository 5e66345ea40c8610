use crate::app::models::{
    BlueprintConfig, ClassifiedFile, ScanResult, SkipReason, SkippedFile, WriteReport,
};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};

/// Streams accepted files into the blueprint, one category at a time.
pub struct OutputGenerator<'a> {
    config: &'a BlueprintConfig,
}

impl<'a> OutputGenerator<'a> {
    pub fn new(config: &'a BlueprintConfig) -> Self {
        Self { config }
    }

    /// Writes every accepted file in `category_order`, sorted by relative
    /// path within each category.
    ///
    /// Only errors from `sink` are returned; a file that cannot be read is
    /// logged, recorded in the report and skipped.
    pub fn write<W: Write>(&self, result: &ScanResult, sink: &mut W) -> io::Result<WriteReport> {
        let mut report = WriteReport::default();
        let mut seen = HashSet::new();

        for category in &self.config.category_order {
            if !seen.insert(category.as_str()) {
                continue;
            }
            let Some(files) = result.files_by_category.get(category) else {
                continue;
            };
            if files.is_empty() {
                continue;
            }

            log::info!("Processing category: {}", category);

            let mut sorted: Vec<&ClassifiedFile> = files.iter().collect();
            sorted.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

            let mut captured = 0;
            for file in sorted {
                let content = match fs::read(&file.path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("[!] Failed to read {}: {}", file.relative_path, e);
                        report.failed.push(SkippedFile {
                            relative_path: file.relative_path.clone(),
                            reason: SkipReason::ReadError(e),
                        });
                        continue;
                    }
                };

                self.write_block(sink, file, &String::from_utf8_lossy(&content))?;
                log::info!("[+] Captured: {}", file.relative_path);
                captured += 1;
            }

            if captured > 0 {
                report.captured_by_category.push((category.clone(), captured));
            }
        }

        Ok(report)
    }

    fn write_block<W: Write>(
        &self,
        sink: &mut W,
        file: &ClassifiedFile,
        content: &str,
    ) -> io::Result<()> {
        writeln!(sink, "--- START OF FILE {} ---", file.relative_path)?;
        if self.config.annotate_provenance {
            writeln!(sink, "# Category: {}", file.category)?;
            writeln!(sink, "# Matched by pattern: {}", file.pattern)?;
            writeln!(sink, "# ---")?;
        }
        sink.write_all(content.as_bytes())?;
        write!(sink, "\n--- END OF FILE {} ---\n\n", file.relative_path)
    }

    /// Categories holding accepted files that `category_order` never emits.
    pub fn unlisted_categories(&self, result: &ScanResult) -> Vec<(String, usize)> {
        let mut unlisted: Vec<(String, usize)> = result
            .files_by_category
            .iter()
            .filter(|(cat, files)| !files.is_empty() && !self.config.category_order.contains(*cat))
            .map(|(cat, files)| (cat.clone(), files.len()))
            .collect();
        unlisted.sort();
        unlisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn add(result: &mut ScanResult, root: &Path, rel: &str, category: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        result
            .files_by_category
            .entry(category.to_string())
            .or_default()
            .push(ClassifiedFile {
                path,
                relative_path: rel.to_string(),
                category: category.to_string(),
                pattern: "**/*".to_string(),
            });
    }

    fn config(order: &[&str], provenance: bool) -> BlueprintConfig {
        BlueprintConfig {
            category_order: order.iter().map(|s| s.to_string()).collect(),
            annotate_provenance: provenance,
            ..BlueprintConfig::default()
        }
    }

    fn render(cfg: &BlueprintConfig, result: &ScanResult) -> (String, WriteReport) {
        let mut out = Vec::new();
        let report = OutputGenerator::new(cfg).write(result, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn writes_delimited_blocks_without_provenance() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "a/keep.md", "DOCS", "hello");

        let (out, report) = render(&config(&["DOCS"], false), &result);
        assert_eq!(
            out,
            "--- START OF FILE a/keep.md ---\nhello\n--- END OF FILE a/keep.md ---\n\n"
        );
        assert_eq!(report.captured_by_category, vec![("DOCS".to_string(), 1)]);
    }

    #[test]
    fn writes_provenance_header_when_enabled() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "a/keep.md", "DOCS", "hello");

        let (out, _) = render(&config(&["DOCS"], true), &result);
        assert_eq!(
            out,
            "--- START OF FILE a/keep.md ---\n\
             # Category: DOCS\n\
             # Matched by pattern: **/*\n\
             # ---\n\
             hello\n\
             --- END OF FILE a/keep.md ---\n\n"
        );
    }

    #[test]
    fn follows_category_order_and_sorts_within_category() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "z/last.md", "DOCS", "z");
        add(&mut result, dir.path(), "a/first.md", "DOCS", "a");
        add(&mut result, dir.path(), "schema.prisma", "SCHEMA", "s");
        add(&mut result, dir.path(), "hidden.txt", "UNLISTED", "u");

        let cfg = config(&["SCHEMA", "EMPTY", "DOCS"], false);
        let (out, report) = render(&cfg, &result);

        let schema = out.find("START OF FILE schema.prisma").unwrap();
        let first = out.find("START OF FILE a/first.md").unwrap();
        let last = out.find("START OF FILE z/last.md").unwrap();
        assert!(schema < first && first < last);
        assert!(!out.contains("hidden.txt"));
        assert_eq!(report.total_captured(), 3);
        assert_eq!(
            OutputGenerator::new(&cfg).unlisted_categories(&result),
            vec![("UNLISTED".to_string(), 1)]
        );
    }

    #[test]
    fn unreadable_file_is_reported_and_skipped() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "a.md", "DOCS", "a");
        add(&mut result, dir.path(), "b.md", "DOCS", "b");
        fs::remove_file(dir.path().join("a.md")).unwrap();

        let (out, report) = render(&config(&["DOCS"], false), &result);
        assert!(!out.contains("a.md"));
        assert!(out.contains("--- START OF FILE b.md ---"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].relative_path, "a.md");
        assert_eq!(report.captured_by_category, vec![("DOCS".to_string(), 1)]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "latin1.txt", "TXT", "");
        fs::write(dir.path().join("latin1.txt"), [b'c', b'a', b'f', 0xE9]).unwrap();

        let (out, _) = render(&config(&["TXT"], false), &result);
        assert!(out.contains("caf\u{FFFD}"));
    }

    #[test]
    fn duplicate_order_entries_emit_once() {
        let dir = TempDir::new().unwrap();
        let mut result = ScanResult::default();
        add(&mut result, dir.path(), "a.md", "DOCS", "a");

        let (out, report) = render(&config(&["DOCS", "DOCS"], false), &result);
        assert_eq!(out.matches("START OF FILE a.md").count(), 1);
        assert_eq!(report.captured_by_category.len(), 1);
    }
}
