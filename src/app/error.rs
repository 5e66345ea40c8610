use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a run before (or instead of) producing a blueprint.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("No configuration file found (looked in: {})", format_candidates(.0))]
    ConfigNotFound(Vec<PathBuf>),
    #[error("Failed to read config at {0:?}")]
    ConfigRead(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config at {0:?}")]
    ConfigParse(PathBuf, #[source] toml::de::Error),
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String, #[source] globset::Error),

    #[error("Project path not found: {0:?}")]
    PathNotFound(PathBuf),
    #[error("Access denied to project path {0:?}")]
    AccessDenied(PathBuf, #[source] std::io::Error),
    #[error("Project path is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Failed to create output file {0:?}")]
    OutputCreate(PathBuf, #[source] std::io::Error),
}

impl BlueprintError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            BlueprintError::ConfigNotFound(_)
                | BlueprintError::ConfigRead(..)
                | BlueprintError::ConfigParse(..)
                | BlueprintError::InvalidPattern(..)
        )
    }

    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            BlueprintError::PathNotFound(_)
                | BlueprintError::AccessDenied(..)
                | BlueprintError::NotADirectory(_)
        )
    }
}

fn format_candidates(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
