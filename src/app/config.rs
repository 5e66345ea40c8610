use crate::app::cli::Cli;
use crate::app::error::BlueprintError;
use crate::app::models::BlueprintConfig;
use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Starter configuration shipped with the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../../blueprint.example.toml");

const LOCAL_CONFIG_NAME: &str = "blueprint.toml";

/// Places searched, in order, when no `--config` is given.
fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_NAME)];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("blueprint").join("config.toml"));
    }
    candidates
}

/// An explicit path must exist; otherwise the first existing candidate wins.
pub fn locate_config(explicit: Option<&Path>) -> Result<PathBuf, BlueprintError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(BlueprintError::ConfigNotFound(vec![path.to_path_buf()]));
        }
        return Ok(path.to_path_buf());
    }

    let candidates = candidate_paths();
    if let Some(found) = candidates.iter().find(|p| p.exists()).cloned() {
        return Ok(found);
    }
    Err(BlueprintError::ConfigNotFound(candidates))
}

pub fn load_config_file(path: &Path) -> Result<BlueprintConfig, BlueprintError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BlueprintError::ConfigNotFound(vec![path.to_path_buf()]),
        _ => BlueprintError::ConfigRead(path.to_path_buf(), e),
    })?;
    parse_config(&content, path)
}

/// `origin` is only used for error messages.
pub fn parse_config(content: &str, origin: &Path) -> Result<BlueprintConfig, BlueprintError> {
    toml::from_str(content).map_err(|e| BlueprintError::ConfigParse(origin.to_path_buf(), e))
}

/// Appends `extra` to `base`, dropping duplicates while keeping first-seen order.
fn merge_vecs(base: Vec<String>, extra: Option<Vec<String>>) -> Vec<String> {
    let mut combined = base;
    if let Some(mut items) = extra {
        combined.append(&mut items);
    }
    let mut seen = HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Loads the config file and layers the CLI overrides on top.
pub fn resolve_config(cli: &Cli) -> Result<BlueprintConfig> {
    let path = locate_config(cli.config.as_deref())?;
    log::info!("[*] Using config file: {}", path.display());

    let mut config = load_config_file(&path)?;
    config.ignore_patterns = merge_vecs(config.ignore_patterns, cli.ignore.clone());
    if let Some(kb) = cli.max_file_size_kb {
        config.max_file_size_kb = kb;
    }
    if cli.no_provenance {
        config.annotate_provenance = false;
    }

    for warning in validate(&config) {
        log::warn!("{}", warning);
    }
    Ok(config)
}

/// Inconsistencies that do not stop a run but are worth pointing out.
pub fn validate(config: &BlueprintConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut defined = HashSet::new();

    for entry in &config.core_file_patterns {
        if !defined.insert(entry.category.as_str()) {
            warnings.push(format!(
                "Category '{}' is defined more than once; later entries only match what earlier ones miss",
                entry.category
            ));
        }
        if entry.patterns.is_empty() {
            warnings.push(format!("Category '{}' has no patterns", entry.category));
        }
    }

    let ordered: HashSet<&str> = config.category_order.iter().map(String::as_str).collect();
    for category in &config.category_order {
        if !defined.contains(category.as_str()) {
            warnings.push(format!(
                "Category '{}' appears in category_order but has no patterns",
                category
            ));
        }
    }
    for entry in &config.core_file_patterns {
        if !ordered.contains(entry.category.as_str()) {
            warnings.push(format!(
                "Category '{}' is not listed in category_order and will never be written",
                entry.category
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{CategoryPatterns, DEFAULT_MAX_FILE_SIZE_KB};
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn bundled_default_config_parses() {
        let config = parse_config(DEFAULT_CONFIG, Path::new("default")).unwrap();
        assert_eq!(config.category_order.len(), 6);
        assert_eq!(config.core_file_patterns.len(), 6);
        assert_eq!(config.core_file_patterns[0].category, "1_ARCHITECTURE_META");
        assert!(config.ignore_patterns.contains(&"node_modules/*".to_string()));
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = parse_config("", Path::new("empty")).unwrap();
        assert!(config.ignore_patterns.is_empty());
        assert!(config.core_file_patterns.is_empty());
        assert_eq!(config.max_file_size_kb, DEFAULT_MAX_FILE_SIZE_KB);
        assert_eq!(config.max_file_size_bytes(), 2048 * 1024);
        assert!(config.annotate_provenance);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn category_entries_keep_declaration_order() {
        let toml = r#"
            [[core_file_patterns]]
            category = "Z"
            patterns = ["z/*"]

            [[core_file_patterns]]
            category = "A"
            patterns = ["a/*", "b/*"]
        "#;
        let config = parse_config(toml, Path::new("inline")).unwrap();
        assert_eq!(
            config.core_file_patterns,
            vec![
                CategoryPatterns {
                    category: "Z".into(),
                    patterns: vec!["z/*".into()],
                },
                CategoryPatterns {
                    category: "A".into(),
                    patterns: vec!["a/*".into(), "b/*".into()],
                },
            ]
        );
    }

    #[test]
    fn malformed_config_is_a_configuration_error() {
        let err = parse_config("max_file_size_kb = \"big\"", Path::new("bad")).unwrap_err();
        assert!(matches!(err, BlueprintError::ConfigParse(..)));
        assert!(err.is_configuration_error());

        let err = parse_config("unknown_key = 1", Path::new("bad")).unwrap_err();
        assert!(matches!(err, BlueprintError::ConfigParse(..)));
    }

    #[test]
    fn explicit_missing_config_is_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = locate_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, BlueprintError::ConfigNotFound(_)));
    }

    #[test]
    fn cli_overrides_are_layered_on_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blueprint.toml");
        fs::write(
            &path,
            "ignore_patterns = [\"dist/*\"]\nmax_file_size_kb = 10\ncategory_order = []\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "blueprint",
            "--config",
            path.to_str().unwrap(),
            "--max-file-size-kb",
            "1",
            "--no-provenance",
            "--ignore",
            "dist/*",
            "*.log",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.ignore_patterns, vec!["dist/*", "*.log"]);
        assert_eq!(config.max_file_size_kb, 1);
        assert!(!config.annotate_provenance);
    }

    #[test]
    fn validation_flags_inconsistent_categories() {
        let config = BlueprintConfig {
            core_file_patterns: vec![
                CategoryPatterns {
                    category: "DOCS".into(),
                    patterns: vec!["**/*.md".into()],
                },
                CategoryPatterns {
                    category: "DOCS".into(),
                    patterns: vec![],
                },
            ],
            category_order: vec!["SCHEMA".into()],
            ..BlueprintConfig::default()
        };
        let warnings = validate(&config);
        assert!(warnings.iter().any(|w| w.contains("more than once")));
        assert!(warnings.iter().any(|w| w.contains("has no patterns")));
        assert!(warnings.iter().any(|w| w.contains("'SCHEMA'")));
        assert!(warnings.iter().any(|w| w.contains("never be written")));
    }
}
