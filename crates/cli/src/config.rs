//! # Configuration
//!
//! Settings for one run come from three places, highest precedence first:
//!
//! 1. command-line flags (`--database-url` also reads `DATABASE_URL`)
//! 2. `fastback.toml`, in the working directory or at `--config <path>`
//! 3. built-in defaults
//!
//! ```toml
//! database_url = "sqlite://shop.db"
//! output_dir = "."
//! prune_stale = false
//!
//! [directories]
//! models = "src/models"
//! repositories = "src/repositories"
//! controllers = "src/controllers"
//! ```

use fastback_codegen::{ArtifactRole, GeneratorConfig};
use fastback_core::{EngineError, EngineResult, Validatable};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "fastback.toml";

// ============================================================================
// File configuration
// ============================================================================

/// Contents of `fastback.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub prune_stale: Option<bool>,
    pub directories: DirectoryConfig,
}

/// `[directories]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub models: Option<PathBuf>,
    pub repositories: Option<PathBuf>,
    pub controllers: Option<PathBuf>,
}

impl FileConfig {
    /// Parse a configuration document
    pub fn parse(text: &str) -> EngineResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| {
            EngineError::with_context(format!("in {}", path.display()), e.to_string())
        })
    }

    /// Load `explicit` when given (it must exist), otherwise `fastback.toml`
    /// from `dir` when present.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> EngineResult<Option<Self>> {
        match explicit {
            Some(path) => Self::load(path).map(Some),
            None => {
                let path = dir.join(CONFIG_FILE);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "Using configuration file");
                    Self::load(&path).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Values given on the command line, before merging
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub prune: bool,
}

/// Everything a run needs, after precedence is applied
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub generator: GeneratorConfig,
}

impl Settings {
    /// Merge command-line values over the file and the defaults.
    ///
    /// # Errors
    ///
    /// `MissingConfig` when no source provides a database URL, and any
    /// validation failure of the resulting generator configuration.
    pub fn resolve(overrides: &Overrides, file: Option<FileConfig>) -> EngineResult<Self> {
        let file = file.unwrap_or_default();

        let database_url = overrides
            .database_url
            .clone()
            .or(file.database_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                EngineError::MissingConfig(
                    "database_url (use --database-url, DATABASE_URL or fastback.toml)".to_string(),
                )
            })?;

        let mut generator = GeneratorConfig::new()
            .with_prune_stale(overrides.prune || file.prune_stale.unwrap_or(false));

        if let Some(dir) = overrides.output_dir.clone().or(file.output_dir) {
            generator = generator.with_output_dir(dir);
        }

        let directories = [
            (ArtifactRole::Model, file.directories.models),
            (ArtifactRole::Repository, file.directories.repositories),
            (ArtifactRole::Controller, file.directories.controllers),
        ];
        for (role, dir) in directories {
            if let Some(dir) = dir {
                generator = generator.with_role_dir(role, dir);
            }
        }

        generator.validate()?;
        Ok(Self {
            database_url,
            generator,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
